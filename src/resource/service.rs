//! Systemd service resource - enabled and active

use anyhow::{Context, Result};
use converge::{ApplyContext, Resource, Satisfaction};

use crate::runner::{self, Cmd, Runner};

#[derive(Debug, Clone)]
pub struct SystemdService {
    pub name: String,
    /// Reload units first; set when the plan wrote this service's unit
    /// file just before
    pub daemon_reload: bool,
    best_effort: bool,
    runner: Runner,
}

impl SystemdService {
    pub fn new(name: &str, runner: Runner) -> Self {
        Self {
            name: name.to_string(),
            daemon_reload: false,
            best_effort: false,
            runner,
        }
    }

    pub fn with_daemon_reload(mut self) -> Self {
        self.daemon_reload = true;
        self
    }

    /// Tolerate failure - used for the app service, which cannot start
    /// until application code has been deployed
    pub fn tolerated(mut self) -> Self {
        self.best_effort = true;
        self
    }

    fn is_enabled(&self) -> bool {
        self.runner
            .succeeds(&Cmd::new("systemctl").args(["is-enabled", "--quiet", self.name.as_str()]))
    }

    fn is_active(&self) -> bool {
        self.runner
            .succeeds(&Cmd::new("systemctl").args(["is-active", "--quiet", self.name.as_str()]))
    }
}

impl Resource for SystemdService {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        format!("Enable and start service '{}'", self.name)
    }

    fn resource_type(&self) -> &'static str {
        "service"
    }

    fn best_effort(&self) -> bool {
        self.best_effort
    }

    fn probe(&self) -> Result<Satisfaction> {
        if !runner::command_exists("systemctl") {
            return Ok(Satisfaction::Unknown {
                reason: "systemctl not found".to_string(),
            });
        }

        if self.is_enabled() && self.is_active() {
            Ok(Satisfaction::Satisfied)
        } else {
            Ok(Satisfaction::Missing)
        }
    }

    fn apply(&self, _ctx: &mut ApplyContext) -> Result<()> {
        if self.daemon_reload {
            self.runner
                .run(&Cmd::new("systemctl").arg("daemon-reload"))
                .context("systemctl daemon-reload failed")?;
        }

        self.runner
            .run(&Cmd::new("systemctl").args(["enable", self.name.as_str()]))
            .with_context(|| format!("could not enable '{}'", self.name))?;

        self.runner
            .run(&Cmd::new("systemctl").args(["start", self.name.as_str()]))
            .with_context(|| format!("could not start '{}'", self.name))?;

        Ok(())
    }
}
