//! Plan command - show the ordered resource list

use anyhow::{Result, bail};
use colored::Colorize;
use converge::Satisfaction;

use crate::Context;
use crate::commands::Env;
use crate::plan;
use crate::sysuser;
use crate::ui;

pub fn run(_ctx: &Context, env: &Env, target: Option<&str>) -> Result<()> {
    let user = match sysuser::lookup(&env.runner, &env.settings.host.target_user)? {
        Some(user) => user,
        None => bail!(
            "target user '{}' does not exist",
            env.settings.host.target_user
        ),
    };

    let plan = plan::build(&env.settings, &user, env.runner).filter_by_target(target)?;

    if plan.is_empty() {
        ui::info("empty plan - check the target selector and enabled sections");
        return Ok(());
    }

    ui::header("Plan");
    ui::dim("resources apply top to bottom; list order is execution order");
    println!();

    for (index, resource) in plan.iter().enumerate() {
        let state = resource.probe().unwrap_or_else(|e| Satisfaction::Unknown {
            reason: format!("{e:#}"),
        });
        let marker = match state {
            Satisfaction::Satisfied => "✓".green().to_string(),
            Satisfaction::Missing => "+".yellow().to_string(),
            Satisfaction::Unknown { .. } => "?".dimmed().to_string(),
        };
        let best_effort = if resource.best_effort() {
            " (best-effort)".dimmed().to_string()
        } else {
            String::new()
        };

        println!(
            "  {:>3}. {marker} [{}] {}{best_effort}",
            index + 1,
            resource.resource_type(),
            resource.description()
        );
    }

    Ok(())
}
