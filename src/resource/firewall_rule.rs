//! Firewall rule resource (ufw)
//!
//! Probes against `ufw show added` rather than `ufw status`: added rules
//! are listed there even while the firewall itself is inactive, which
//! keeps the probe stable on hosts where the operator has not enabled
//! ufw. Whether to enable the firewall at all stays an operator decision
//! (a remote provisioning run that enables ufw can cut its own SSH
//! session off).

use anyhow::{Context, Result};
use converge::{ApplyContext, Resource, Satisfaction};

use crate::runner::{self, Cmd, Runner};

#[derive(Debug, Clone)]
pub struct FirewallRule {
    /// Anything `ufw allow` accepts: an app profile ("OpenSSH",
    /// "Nginx Full") or a port spec ("8000/tcp")
    pub rule: String,
    runner: Runner,
}

impl FirewallRule {
    pub fn new(rule: &str, runner: Runner) -> Self {
        Self {
            rule: rule.to_string(),
            runner,
        }
    }
}

impl Resource for FirewallRule {
    fn id(&self) -> String {
        self.rule.clone()
    }

    fn description(&self) -> String {
        format!("Allow '{}' through the firewall", self.rule)
    }

    fn resource_type(&self) -> &'static str {
        "firewall_rule"
    }

    fn probe(&self) -> Result<Satisfaction> {
        if !runner::command_exists("ufw") {
            return Ok(Satisfaction::Unknown {
                reason: "ufw not found".to_string(),
            });
        }

        let output = self
            .runner
            .output(&Cmd::new("ufw").args(["show", "added"]))
            .context("failed to run ufw")?;

        if !output.success {
            return Ok(Satisfaction::Unknown {
                reason: format!("ufw show added failed: {}", output.stderr.trim()),
            });
        }

        // Lines look like: "ufw allow OpenSSH" / "ufw allow 8000/tcp"
        let wanted = format!("ufw allow {}", self.rule);
        let present = output.stdout.lines().any(|l| l.trim() == wanted);

        if present {
            Ok(Satisfaction::Satisfied)
        } else {
            Ok(Satisfaction::Missing)
        }
    }

    fn apply(&self, _ctx: &mut ApplyContext) -> Result<()> {
        // `ufw allow` takes the rule as a single token ("Nginx Full" is
        // one profile name, not two arguments)
        self.runner
            .run(&Cmd::new("ufw").arg("allow").arg(&self.rule))
            .with_context(|| format!("could not add firewall rule '{}'", self.rule))?;
        Ok(())
    }
}
