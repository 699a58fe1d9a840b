//! Status command - probe everything, mutate nothing

use anyhow::{Result, bail};
use colored::Colorize;
use converge::Satisfaction;
use serde::Serialize;

use crate::Context;
use crate::commands::Env;
use crate::plan;
use crate::sysuser;
use crate::ui;

#[derive(Serialize)]
struct StatusEntry {
    id: String,
    resource_type: String,
    state: Satisfaction,
}

pub fn run(ctx: &Context, env: &Env, target: Option<&str>, json: bool) -> Result<()> {
    let user = match sysuser::lookup(&env.runner, &env.settings.host.target_user)? {
        Some(user) => user,
        None => bail!(
            "target user '{}' does not exist",
            env.settings.host.target_user
        ),
    };

    let plan = plan::build(&env.settings, &user, env.runner).filter_by_target(target)?;

    if plan.is_empty() && !json {
        ui::info("nothing matches - check the target selector and enabled sections");
        return Ok(());
    }

    let entries: Vec<StatusEntry> = plan
        .iter()
        .map(|resource| StatusEntry {
            id: resource.id(),
            resource_type: resource.resource_type().to_string(),
            state: resource.probe().unwrap_or_else(|e| Satisfaction::Unknown {
                reason: format!("{e:#}"),
            }),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    ui::header("Status");

    let mut satisfied = 0usize;
    let mut missing = 0usize;
    let mut unknown = 0usize;

    for entry in &entries {
        let label = match &entry.state {
            Satisfaction::Satisfied => {
                satisfied += 1;
                "ok".green().to_string()
            }
            Satisfaction::Missing => {
                missing += 1;
                "missing".yellow().to_string()
            }
            Satisfaction::Unknown { .. } => {
                unknown += 1;
                "unknown".dimmed().to_string()
            }
        };

        println!("  {label:<18} {:<14} {}", entry.resource_type, entry.id);
        if ctx.verbose > 0
            && let Satisfaction::Unknown { reason } = &entry.state
        {
            ui::dim(reason);
        }
    }

    println!();
    println!("  {satisfied} satisfied, {missing} missing, {unknown} unknown");

    if missing > 0 && !ctx.quiet {
        ui::info("run 'groundwork apply' to reconcile");
    }

    Ok(())
}
