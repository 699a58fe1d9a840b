//! Console progress for reconciliation runs

use colored::Colorize;
use converge::{Outcome, ProgressCallback, Report};

use crate::ui;

/// Prints one status line per resource as the walk proceeds
pub struct ConsoleProgress {
    total: usize,
    current: usize,
    quiet: bool,
}

impl ConsoleProgress {
    pub fn new(quiet: bool) -> Self {
        Self {
            total: 0,
            current: 0,
            quiet,
        }
    }
}

impl ProgressCallback for ConsoleProgress {
    fn on_plan_start(&mut self, total: usize) {
        self.total = total;
        if !self.quiet {
            println!();
        }
    }

    fn on_resource_start(&mut self, _id: &str, description: &str) {
        self.current += 1;
        if !self.quiet {
            ui::step(self.current, self.total, description);
        }
    }

    fn on_probe_warning(&mut self, id: &str, reason: &str) {
        log::warn!("{id}: probe could not run: {reason}");
    }

    fn on_resource_complete(&mut self, id: &str, outcome: &Outcome) {
        if self.quiet && !outcome.is_failure() {
            return;
        }

        // Skipped resources after an abort never passed on_resource_start
        if let Outcome::Skipped { reason } = outcome {
            println!("  {} {id} {}", "-".dimmed(), reason.dimmed());
            return;
        }

        match outcome {
            Outcome::AlreadySatisfied => {
                println!("  {} {id} {}", "✓".green(), "(already satisfied)".dimmed());
            }
            Outcome::Applied => println!("  {} {id}", "✓".green()),
            Outcome::Failed { reason } => {
                eprintln!("  {} {id}: {reason}", "✗".red());
            }
            Outcome::Skipped { .. } => {}
        }
    }

    fn on_plan_complete(&mut self, _report: &Report) {}
}
