//! Apply command - reconcile the host to the desired state

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use converge::{ReconcileOptions, reconcile};

use crate::Context;
use crate::cli::ApplyArgs;
use crate::commands::Env;
use crate::plan;
use crate::precondition;
use crate::progress::ConsoleProgress;
use crate::ui;

pub fn run(ctx: &Context, env: &Env, args: &ApplyArgs) -> Result<()> {
    // Both checks run before anything can mutate
    let user = precondition::check(&env.runner, &env.settings.host.target_user)?;

    let plan = plan::build(&env.settings, &user, env.runner)
        .filter_by_target(args.target.as_deref())?;

    if plan.is_empty() {
        ui::success("nothing to do - no resources selected");
        return Ok(());
    }

    if !ctx.quiet {
        println!(
            "  {} resources for user {} ({})",
            plan.len().to_string().bold(),
            user.name.bold(),
            if args.dry_run { "dry run" } else { "apply" }
        );
    }

    if !args.dry_run && !args.yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt("Reconcile this host?")
            .default(true)
            .interact()
            .context("failed to read confirmation")?;
        if !confirmed {
            ui::info("aborted - nothing was changed");
            return Ok(());
        }
    }

    let opts = ReconcileOptions {
        dry_run: args.dry_run,
        verbose: ctx.verbose > 0,
    };

    let mut progress = ConsoleProgress::new(ctx.quiet);
    let report = reconcile(plan, &opts, &mut progress);

    if !ctx.quiet || !report.is_success() {
        ui::print_report(&report);
    }

    if !report.is_success() {
        anyhow::bail!(
            "{} required resource(s) failed; plan aborted after the first failure",
            report.required_failures()
        );
    }

    if report.failed() > 0 {
        // Only best-effort failures left; the run still counts as a pass
        ui::warn("some best-effort resources failed (see summary)");
    }

    Ok(())
}
