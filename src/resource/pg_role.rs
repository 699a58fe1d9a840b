//! PostgreSQL role resource
//!
//! All statements run through psql as the postgres OS user. Role names
//! come from validated settings (plain identifiers); only the password is
//! free-form and it is escaped before landing in the CREATE ROLE string.

use anyhow::{Context, Result};
use converge::{ApplyContext, Resource, Satisfaction};

use crate::runner::{self, Cmd, Runner};

#[derive(Debug, Clone)]
pub struct PgRole {
    pub name: String,
    /// None means peer authentication only
    pub password: Option<String>,
    runner: Runner,
}

impl PgRole {
    pub fn new(name: &str, password: Option<&str>, runner: Runner) -> Self {
        Self {
            name: name.to_string(),
            password: password.map(str::to_string),
            runner,
        }
    }
}

impl Resource for PgRole {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        format!("Create database role '{}'", self.name)
    }

    fn resource_type(&self) -> &'static str {
        "pg_role"
    }

    fn probe(&self) -> Result<Satisfaction> {
        if !runner::command_exists("psql") {
            return Ok(Satisfaction::Unknown {
                reason: "psql not found".to_string(),
            });
        }

        let query = format!("SELECT 1 FROM pg_roles WHERE rolname='{}'", self.name);
        let output = self
            .runner
            .output(&Cmd::new("psql").args(["-tAc", query.as_str()]).as_user("postgres"))
            .context("failed to run psql")?;

        if !output.success {
            // Server not up yet (it is ordered right before this probe)
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
        let statement = match &self.password {
            Some(password) => format!(
                "CREATE ROLE \"{}\" LOGIN PASSWORD '{}'",
                self.name,
                escape_literal(password)
            ),
            None => format!("CREATE ROLE \"{}\" LOGIN", self.name),
        };

        let result = self
            .runner
            .run(&Cmd::new("psql").args(["-c", statement.as_str()]).as_user("postgres"));

        match result {
            Ok(_) => Ok(()),
            // A half-applied previous run may have left the role behind
            Err(e) if e.to_string().contains("already exists") => {
                log::info!("role '{}' already exists", self.name);
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("could not create role '{}'", self.name)),
        }
    }
}

/// Double single quotes per SQL string-literal rules
fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("plain"), "plain");
        assert_eq!(escape_literal("o'brien"), "o''brien");
    }
}
