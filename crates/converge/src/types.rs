//! Core types for the reconciliation engine

use serde::{Deserialize, Serialize};

/// Result of probing a resource's current state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Satisfaction {
    /// Desired state already holds
    Satisfied,
    /// Desired state does not hold
    Missing,
    /// The check itself could not run (e.g. inspection command absent)
    Unknown { reason: String },
}

impl Satisfaction {
    /// Check if the desired state already holds
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied)
    }
}

/// Final result of reconciling one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Probe reported the desired state already held; nothing was done
    AlreadySatisfied,
    /// The action ran and the re-probe confirmed the desired state
    Applied,
    /// The resource was not attempted (dry run, or an earlier required
    /// resource failed)
    Skipped { reason: String },
    /// The action errored, or its re-probe still reported missing
    Failed { reason: String },
}

impl Outcome {
    /// Check if the outcome represents a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Check if the outcome represents a change made to the host
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Options for a reconciliation run
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Probe and report only; never invoke an action
    pub dry_run: bool,
    /// Verbose output from actions
    pub verbose: bool,
}

/// Per-resource entry in the final report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceOutcome {
    /// Unique identifier of the resource
    pub id: String,
    /// Resource type category
    pub resource_type: String,
    /// Human-readable description
    pub description: String,
    /// Whether a failure of this resource aborts the plan
    pub best_effort: bool,
    /// Final outcome
    pub outcome: Outcome,
}

/// Report of a full reconciliation pass
///
/// Lists every resource of the plan in plan order, plus any probe
/// warnings collected along the way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    /// Per-resource outcomes, in plan order
    pub outcomes: Vec<ResourceOutcome>,
    /// Warnings from probes that could not run (treated as missing)
    pub warnings: Vec<String>,
    /// Whether the walk was aborted by a required-resource failure
    pub aborted: bool,
}

impl Report {
    /// Number of resources whose desired state already held
    pub fn already_satisfied(&self) -> usize {
        self.count(|o| matches!(o, Outcome::AlreadySatisfied))
    }

    /// Number of resources the run changed
    pub fn applied(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Applied))
    }

    /// Number of resources never attempted
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped { .. }))
    }

    /// Number of failed resources, best-effort included
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    /// Number of failed resources that were required
    pub fn required_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|r| r.outcome.is_failure() && !r.best_effort)
            .count()
    }

    /// A run succeeds when no required resource failed
    ///
    /// Best-effort failures are reported but do not fail the run.
    pub fn is_success(&self) -> bool {
        self.required_failures() == 0 && !self.aborted
    }

    /// Total number of resources in the report
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|r| pred(&r.outcome)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(outcome: Outcome, best_effort: bool) -> ResourceOutcome {
        ResourceOutcome {
            id: "r".into(),
            resource_type: "test".into(),
            description: "test".into(),
            best_effort,
            outcome,
        }
    }

    #[test]
    fn test_report_counts() {
        let report = Report {
            outcomes: vec![
                entry(Outcome::AlreadySatisfied, false),
                entry(Outcome::Applied, false),
                entry(
                    Outcome::Failed {
                        reason: "boom".into(),
                    },
                    true,
                ),
            ],
            warnings: Vec::new(),
            aborted: false,
        };

        assert_eq!(report.already_satisfied(), 1);
        assert_eq!(report.applied(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.required_failures(), 0);
        assert!(report.is_success());
    }

    #[test]
    fn test_required_failure_fails_run() {
        let report = Report {
            outcomes: vec![entry(
                Outcome::Failed {
                    reason: "boom".into(),
                },
                false,
            )],
            warnings: Vec::new(),
            aborted: true,
        };

        assert_eq!(report.required_failures(), 1);
        assert!(!report.is_success());
    }
}
