//! The reconciler - sequential plan walk with probe/apply/verify
//!
//! Per-resource state machine:
//! `probe -> Satisfied` terminates as `AlreadySatisfied`;
//! `probe -> Missing/Unknown -> apply -> re-probe` terminates as
//! `Applied` when the re-probe confirms, `Failed` otherwise.

use crate::context::{ApplyContext, ProgressCallback};
use crate::plan::Plan;
use crate::types::{Outcome, ReconcileOptions, Report, ResourceOutcome, Satisfaction};

/// Walk the plan in order, applying what is missing
///
/// Never returns an error: every per-resource failure is captured in the
/// report. A failed required resource aborts the walk and the remaining
/// resources are recorded as `Skipped`.
pub fn reconcile<P: ProgressCallback>(
    plan: Plan,
    opts: &ReconcileOptions,
    progress: &mut P,
) -> Report {
    let mut report = Report::default();
    let mut aborted = false;

    progress.on_plan_start(plan.len());

    for resource in plan.into_resources() {
        if aborted {
            let outcome = Outcome::Skipped {
                reason: "not attempted: an earlier required resource failed".to_string(),
            };
            progress.on_resource_complete(&resource.id(), &outcome);
            report.outcomes.push(ResourceOutcome {
                id: resource.id(),
                resource_type: resource.resource_type().to_string(),
                description: resource.description(),
                best_effort: resource.best_effort(),
                outcome,
            });
            continue;
        }

        progress.on_resource_start(&resource.id(), &resource.description());

        // A probe error is not fatal: absence of the inspection tool must
        // not mask a missing resource, so we retry optimistically.
        let satisfaction = match resource.probe() {
            Ok(s) => s,
            Err(e) => Satisfaction::Unknown {
                reason: format!("{e:#}"),
            },
        };

        if let Satisfaction::Unknown { reason } = &satisfaction {
            let warning = format!("{}: probe could not run ({reason})", resource.id());
            progress.on_probe_warning(&resource.id(), reason);
            report.warnings.push(warning);
        }

        let outcome = if satisfaction.is_satisfied() {
            Outcome::AlreadySatisfied
        } else if opts.dry_run {
            Outcome::Skipped {
                reason: "dry run".to_string(),
            }
        } else {
            apply_and_verify(resource.as_ref(), opts, &mut report.warnings)
        };

        if outcome.is_failure() && !resource.best_effort() {
            aborted = true;
        }

        progress.on_resource_complete(&resource.id(), &outcome);
        report.outcomes.push(ResourceOutcome {
            id: resource.id(),
            resource_type: resource.resource_type().to_string(),
            description: resource.description(),
            best_effort: resource.best_effort(),
            outcome,
        });
    }

    report.aborted = aborted;
    progress.on_plan_complete(&report);
    report
}

/// Apply one resource and re-probe to confirm the effect
///
/// The re-probe defends against external commands that exit zero without
/// doing their work: a clean apply whose re-probe still reports missing
/// is a failure. A re-probe that cannot run is recorded as a warning but
/// cannot disprove the apply, so the outcome stays `Applied`.
fn apply_and_verify(
    resource: &dyn crate::resource::Resource,
    opts: &ReconcileOptions,
    warnings: &mut Vec<String>,
) -> Outcome {
    let mut ctx = ApplyContext::new(opts.dry_run, opts.verbose);

    if let Err(e) = resource.apply(&mut ctx) {
        return Outcome::Failed {
            reason: format!("{e:#}"),
        };
    }

    match resource.probe() {
        Ok(Satisfaction::Satisfied) => Outcome::Applied,
        Ok(_) => Outcome::Failed {
            reason: "verification failed: resource still missing after apply".to_string(),
        },
        Err(e) => {
            warnings.push(format!(
                "{}: verification probe could not run ({e:#})",
                resource.id()
            ));
            Outcome::Applied
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NoProgress;
    use crate::resource::Resource;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// Shared call log so tests can assert exactly which resources ran
    type CallLog = Arc<Mutex<Vec<String>>>;

    #[derive(Debug)]
    struct FakeResource {
        id: String,
        satisfied: Arc<AtomicBool>,
        fail_apply: bool,
        // When true the apply "succeeds" but never flips the probe
        silently_broken: bool,
        best_effort: bool,
        log: CallLog,
    }

    impl FakeResource {
        fn new(id: &str, log: &CallLog) -> Self {
            Self {
                id: id.to_string(),
                satisfied: Arc::new(AtomicBool::new(false)),
                fail_apply: false,
                silently_broken: false,
                best_effort: false,
                log: Arc::clone(log),
            }
        }

        fn satisfied(id: &str, log: &CallLog) -> Self {
            let r = Self::new(id, log);
            r.satisfied.store(true, Ordering::SeqCst);
            r
        }
    }

    impl Resource for FakeResource {
        fn id(&self) -> String {
            self.id.clone()
        }

        fn description(&self) -> String {
            format!("fake {}", self.id)
        }

        fn resource_type(&self) -> &'static str {
            "fake"
        }

        fn best_effort(&self) -> bool {
            self.best_effort
        }

        fn probe(&self) -> anyhow::Result<Satisfaction> {
            self.log.lock().unwrap().push(format!("probe:{}", self.id));
            if self.satisfied.load(Ordering::SeqCst) {
                Ok(Satisfaction::Satisfied)
            } else {
                Ok(Satisfaction::Missing)
            }
        }

        fn apply(&self, _ctx: &mut ApplyContext) -> anyhow::Result<()> {
            self.log.lock().unwrap().push(format!("apply:{}", self.id));
            if self.fail_apply {
                anyhow::bail!("exit status 1");
            }
            if !self.silently_broken {
                self.satisfied.store(true, Ordering::SeqCst);
            }
            Ok(())
        }
    }

    fn run(plan: Plan) -> Report {
        reconcile(plan, &ReconcileOptions::default(), &mut NoProgress)
    }

    #[test]
    fn test_satisfied_resource_is_not_applied() {
        let log: CallLog = Arc::default();
        let mut plan = Plan::new();
        plan.push(Box::new(FakeResource::satisfied("a", &log)));

        let report = run(plan);

        assert_eq!(report.already_satisfied(), 1);
        assert_eq!(*log.lock().unwrap(), vec!["probe:a"]);
    }

    #[test]
    fn test_missing_resource_is_applied_and_verified() {
        let log: CallLog = Arc::default();
        let mut plan = Plan::new();
        plan.push(Box::new(FakeResource::new("a", &log)));

        let report = run(plan);

        assert_eq!(report.applied(), 1);
        assert!(report.is_success());
        // probe, apply, verification re-probe
        assert_eq!(*log.lock().unwrap(), vec!["probe:a", "apply:a", "probe:a"]);
    }

    #[test]
    fn test_fail_fast_skips_later_resources() {
        let log: CallLog = Arc::default();
        let mut failing = FakeResource::new("a", &log);
        failing.fail_apply = true;

        let mut plan = Plan::new();
        plan.push(Box::new(failing));
        plan.push(Box::new(FakeResource::new("b", &log)));

        let report = run(plan);

        assert!(report.aborted);
        assert!(!report.is_success());
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 1);
        // b was never probed or applied
        let calls = log.lock().unwrap();
        assert!(!calls.iter().any(|c| c.ends_with(":b")));
    }

    #[test]
    fn test_best_effort_failure_does_not_abort() {
        let log: CallLog = Arc::default();
        let mut tolerated = FakeResource::new("a", &log);
        tolerated.fail_apply = true;
        tolerated.best_effort = true;

        let mut plan = Plan::new();
        plan.push(Box::new(tolerated));
        plan.push(Box::new(FakeResource::new("b", &log)));

        let report = run(plan);

        assert!(!report.aborted);
        assert!(report.is_success());
        assert_eq!(report.failed(), 1);
        assert_eq!(report.applied(), 1);
    }

    #[test]
    fn test_silent_action_failure_is_caught_by_verification() {
        let log: CallLog = Arc::default();
        let mut broken = FakeResource::new("a", &log);
        broken.silently_broken = true;

        let mut plan = Plan::new();
        plan.push(Box::new(broken));

        let report = run(plan);

        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
        match &report.outcomes[0].outcome {
            Outcome::Failed { reason } => assert!(reason.contains("verification")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_dry_run_never_applies() {
        let log: CallLog = Arc::default();
        let mut plan = Plan::new();
        plan.push(Box::new(FakeResource::new("a", &log)));

        let opts = ReconcileOptions {
            dry_run: true,
            ..Default::default()
        };
        let report = reconcile(plan, &opts, &mut NoProgress);

        assert_eq!(report.skipped(), 1);
        assert!(!log.lock().unwrap().iter().any(|c| c.starts_with("apply")));
    }

    #[test]
    fn test_marker_file_resource_converges() {
        #[derive(Debug)]
        struct Marker {
            path: std::path::PathBuf,
        }

        impl Resource for Marker {
            fn id(&self) -> String {
                self.path.display().to_string()
            }

            fn description(&self) -> String {
                format!("marker {}", self.path.display())
            }

            fn resource_type(&self) -> &'static str {
                "marker"
            }

            fn probe(&self) -> anyhow::Result<Satisfaction> {
                if self.path.exists() {
                    Ok(Satisfaction::Satisfied)
                } else {
                    Ok(Satisfaction::Missing)
                }
            }

            fn apply(&self, _ctx: &mut ApplyContext) -> anyhow::Result<()> {
                std::fs::write(&self.path, b"")?;
                Ok(())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provisioned");

        let mut plan = Plan::new();
        plan.push(Box::new(Marker { path: path.clone() }));
        let report = run(plan);
        assert_eq!(report.applied(), 1);
        assert!(path.exists());

        // Second run with the same desired state changes nothing
        let mut plan = Plan::new();
        plan.push(Box::new(Marker { path }));
        let report = run(plan);
        assert_eq!(report.already_satisfied(), 1);
        assert_eq!(report.applied(), 0);
    }

    #[test]
    fn test_unknown_probe_is_retried_and_warned() {
        #[derive(Debug)]
        struct UnknownProbe {
            applied: Arc<AtomicBool>,
        }

        impl Resource for UnknownProbe {
            fn id(&self) -> String {
                "u".into()
            }

            fn description(&self) -> String {
                "unknown probe".into()
            }

            fn resource_type(&self) -> &'static str {
                "fake"
            }

            fn probe(&self) -> anyhow::Result<Satisfaction> {
                if self.applied.load(Ordering::SeqCst) {
                    Ok(Satisfaction::Satisfied)
                } else {
                    Ok(Satisfaction::Unknown {
                        reason: "dpkg-query not found".into(),
                    })
                }
            }

            fn apply(&self, _ctx: &mut ApplyContext) -> anyhow::Result<()> {
                self.applied.store(true, Ordering::SeqCst);
                Ok(())
            }
        }

        let mut plan = Plan::new();
        plan.push(Box::new(UnknownProbe {
            applied: Arc::default(),
        }));

        let report = run(plan);

        assert_eq!(report.applied(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("dpkg-query"));
    }
}
