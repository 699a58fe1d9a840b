#![allow(dead_code)]

use colored::Colorize;
use converge::{Outcome, Report};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.len()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a step indicator
pub fn step(num: usize, total: usize, msg: &str) {
    println!("{} {}", format!("[{}/{}]", num, total).blue().bold(), msg);
}

/// One-word colored label for an outcome
pub fn outcome_label(outcome: &Outcome) -> String {
    match outcome {
        Outcome::AlreadySatisfied => "ok".green().to_string(),
        Outcome::Applied => "applied".green().bold().to_string(),
        Outcome::Skipped { .. } => "skipped".dimmed().to_string(),
        Outcome::Failed { .. } => "FAILED".red().bold().to_string(),
    }
}

/// Final summary table of a reconciliation report
pub fn print_report(report: &Report) {
    header("Summary");

    for entry in &report.outcomes {
        let label = outcome_label(&entry.outcome);
        let suffix = match &entry.outcome {
            Outcome::Failed { reason } => format!(" - {reason}"),
            Outcome::Skipped { reason } => format!(" - {reason}"),
            _ => String::new(),
        };
        let best_effort = if entry.best_effort { " (best-effort)" } else { "" };
        println!(
            "  {label:<18} {:<14} {}{best_effort}{}",
            entry.resource_type,
            entry.id,
            suffix.dimmed()
        );
    }

    println!();
    println!(
        "  {} satisfied, {} applied, {} skipped, {} failed",
        report.already_satisfied(),
        report.applied(),
        report.skipped(),
        report.failed()
    );

    for warning in &report.warnings {
        warn(warning);
    }
}
