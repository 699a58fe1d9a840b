//! PostgreSQL database resource

use anyhow::{Context, Result};
use converge::{ApplyContext, Resource, Satisfaction};

use crate::runner::{self, Cmd, Runner};

/// A database owned by an existing role
///
/// Planned after the owning role; `createdb -O` fails cleanly if the
/// ordering is ever violated.
#[derive(Debug, Clone)]
pub struct PgDatabase {
    pub name: String,
    pub owner: String,
    runner: Runner,
}

impl PgDatabase {
    pub fn new(name: &str, owner: &str, runner: Runner) -> Self {
        Self {
            name: name.to_string(),
            owner: owner.to_string(),
            runner,
        }
    }
}

impl Resource for PgDatabase {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        format!("Create database '{}' owned by '{}'", self.name, self.owner)
    }

    fn resource_type(&self) -> &'static str {
        "pg_database"
    }

    fn probe(&self) -> Result<Satisfaction> {
        if !runner::command_exists("psql") {
            return Ok(Satisfaction::Unknown {
                reason: "psql not found".to_string(),
            });
        }

        let query = format!("SELECT 1 FROM pg_database WHERE datname='{}'", self.name);
        let output = self
            .runner
            .output(&Cmd::new("psql").args(["-tAc", query.as_str()]).as_user("postgres"))
            .context("failed to run psql")?;

        if !output.success {
            return Ok(Satisfaction::Unknown {
                reason: format!("psql could not connect: {}", output.stderr.trim()),
            });
        }

        if output.stdout_trimmed() == "1" {
            Ok(Satisfaction::Satisfied)
        } else {
            Ok(Satisfaction::Missing)
        }
    }

    fn apply(&self, _ctx: &mut ApplyContext) -> Result<()> {
        let result = self.runner.run(
            &Cmd::new("createdb")
                .args(["-O", self.owner.as_str(), self.name.as_str()])
                .as_user("postgres"),
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("already exists") => {
                log::info!("database '{}' already exists", self.name);
                Ok(())
            }
            Err(e) => {
                Err(e).with_context(|| format!("could not create database '{}'", self.name))
            }
        }
    }
}
