//! Default login shell resource

use anyhow::{Context, Result};
use converge::{ApplyContext, Resource, Satisfaction};

use crate::runner::{Cmd, Runner};
use crate::sysuser;

#[derive(Debug, Clone)]
pub struct DefaultShell {
    pub user: String,
    pub shell: String,
    runner: Runner,
}

impl DefaultShell {
    pub fn new(user: &str, shell: &str, runner: Runner) -> Self {
        Self {
            user: user.to_string(),
            shell: shell.to_string(),
            runner,
        }
    }
}

impl Resource for DefaultShell {
    fn id(&self) -> String {
        self.user.clone()
    }

    fn description(&self) -> String {
        format!("Set login shell of '{}' to {}", self.user, self.shell)
    }

    fn resource_type(&self) -> &'static str {
        "default_shell"
    }

    fn probe(&self) -> Result<Satisfaction> {
        match sysuser::lookup(&self.runner, &self.user) {
            Ok(Some(entry)) if entry.shell == self.shell => Ok(Satisfaction::Satisfied),
            Ok(Some(_)) => Ok(Satisfaction::Missing),
            // Preconditions verified the user; a vanished account is a
            // real inconsistency, not a missing resource
            Ok(None) => Ok(Satisfaction::Unknown {
                reason: format!("user '{}' no longer exists", self.user),
            }),
            Err(e) => Ok(Satisfaction::Unknown {
                reason: format!("{e:#}"),
            }),
        }
    }

    fn apply(&self, _ctx: &mut ApplyContext) -> Result<()> {
        self.runner
            .run(&Cmd::new("chsh").args(["-s", self.shell.as_str(), self.user.as_str()]))
            .with_context(|| format!("could not change shell for '{}'", self.user))?;
        Ok(())
    }
}
