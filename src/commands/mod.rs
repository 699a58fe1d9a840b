//! Command implementations

pub mod apply;
pub mod plan;
pub mod status;

use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;
use std::time::Duration;

use crate::config::Settings;
use crate::runner::Runner;

/// Settings plus the runner configured from them
pub struct Env {
    pub settings: Settings,
    pub runner: Runner,
}

/// Load and validate settings, derive the command runner
pub fn load_env(config_path: Option<&Path>) -> Result<Env> {
    let settings = Settings::load(config_path)?;
    settings.validate().context("invalid settings")?;

    let runner = Runner::new(Duration::from_secs(settings.host.command_timeout_secs));
    Ok(Env { settings, runner })
}
