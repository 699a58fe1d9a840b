//! Git clone resource - plugin framework checkouts

use anyhow::{Context, Result};
use converge::{ApplyContext, Resource, Satisfaction};
use std::path::PathBuf;

use crate::runner::{self, Cmd, Runner};

/// A repository cloned into a fixed destination
///
/// The clone runs as the owning user so the checkout is writable by them
/// without a recursive chown afterwards.
#[derive(Debug, Clone)]
pub struct GitClone {
    pub url: String,
    pub dest: PathBuf,
    pub user: String,
    /// Clone submodules too (Prezto carries its modules that way)
    pub recursive: bool,
    runner: Runner,
}

impl GitClone {
    pub fn new(url: &str, dest: impl Into<PathBuf>, user: &str, runner: Runner) -> Self {
        Self {
            url: url.to_string(),
            dest: dest.into(),
            user: user.to_string(),
            recursive: false,
            runner,
        }
    }

    pub fn with_submodules(mut self) -> Self {
        self.recursive = true;
        self
    }
}

impl Resource for GitClone {
    fn id(&self) -> String {
        self.dest.display().to_string()
    }

    fn description(&self) -> String {
        format!("Clone {} into {}", self.url, self.dest.display())
    }

    fn resource_type(&self) -> &'static str {
        "git_clone"
    }

    fn probe(&self) -> Result<Satisfaction> {
        // An existing checkout is not re-fetched; updates are the
        // framework's own concern
        if self.dest.join(".git").exists() {
            Ok(Satisfaction::Satisfied)
        } else if self.dest.exists() {
            Ok(Satisfaction::Unknown {
                reason: format!("{} exists but is not a git checkout", self.dest.display()),
            })
        } else {
            Ok(Satisfaction::Missing)
        }
    }

    fn apply(&self, _ctx: &mut ApplyContext) -> Result<()> {
        if !runner::command_exists("git") {
            anyhow::bail!("git is not installed");
        }

        let dest = self.dest.display().to_string();
        let mut cmd = Cmd::new("git").arg("clone");
        if self.recursive {
            cmd = cmd.arg("--recursive");
        }
        cmd = cmd.args([self.url.as_str(), dest.as_str()]).as_user(&self.user);

        self.runner
            .run(&cmd)
            .with_context(|| format!("could not clone {}", self.url))?;
        Ok(())
    }
}
