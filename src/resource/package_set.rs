//! Package set resource - apt packages installed as one unit

use anyhow::{Context, Result};
use converge::{ApplyContext, Resource, Satisfaction};

use crate::runner::{self, Cmd, Runner};

/// A named set of apt packages
///
/// The set is satisfied only when every member is installed; a partial
/// set is applied as a whole (apt skips the members that are already
/// there).
#[derive(Debug, Clone)]
pub struct PackageSet {
    pub name: String,
    pub packages: Vec<String>,
    /// Run `apt-get update` before installing; set on the first package
    /// set of a plan so the index is refreshed once per run
    pub refresh_index: bool,
    runner: Runner,
}

impl PackageSet {
    pub fn new(name: &str, packages: &[&str], runner: Runner) -> Self {
        Self {
            name: name.to_string(),
            packages: packages.iter().map(|p| (*p).to_string()).collect(),
            refresh_index: false,
            runner,
        }
    }

    pub fn with_index_refresh(mut self) -> Self {
        self.refresh_index = true;
        self
    }

    fn is_installed(&self, package: &str) -> Result<bool> {
        let output = self
            .runner
            .output(
                &Cmd::new("dpkg-query")
                    .args(["-W", "-f=${Status}", package]),
            )
            .context("failed to run dpkg-query")?;

        // Unknown packages make dpkg-query exit non-zero; that is a
        // plain "not installed", not an error.
        Ok(output.success && output.stdout.contains("install ok installed"))
    }
}

impl Resource for PackageSet {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        format!(
            "Install packages [{}] ({})",
            self.packages.join(", "),
            self.name
        )
    }

    fn resource_type(&self) -> &'static str {
        "package_set"
    }

    fn probe(&self) -> Result<Satisfaction> {
        if !runner::command_exists("dpkg-query") {
            return Ok(Satisfaction::Unknown {
                reason: "dpkg-query not found; is this a Debian-family host?".to_string(),
            });
        }

        for package in &self.packages {
            if !self.is_installed(package)? {
                return Ok(Satisfaction::Missing);
            }
        }

        Ok(Satisfaction::Satisfied)
    }

    fn apply(&self, _ctx: &mut ApplyContext) -> Result<()> {
        if self.refresh_index {
            self.runner
                .run(
                    &Cmd::new("apt-get")
                        .arg("update")
                        .env("DEBIAN_FRONTEND", "noninteractive"),
                )
                .context("apt-get update failed")?;
        }

        self.runner
            .run(
                &Cmd::new("apt-get")
                    .args(["install", "-y"])
                    .args(&self.packages)
                    .env("DEBIAN_FRONTEND", "noninteractive"),
            )
            .with_context(|| format!("apt-get install failed for set '{}'", self.name))?;

        Ok(())
    }
}
