//! Operator settings
//!
//! One TOML file describes the whole desired host. Every key is optional
//! and falls back to a documented default; a missing file means "all
//! defaults". The settings struct is built once at startup, validated,
//! and passed by reference to the plan builder - resources never consult
//! the environment themselves.

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Default settings path consulted when --config is not given
pub const DEFAULT_PATH: &str = "/etc/groundwork.toml";

/// Invalid operator-supplied setting
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{field} must match [a-z_][a-z0-9_]* (got '{value}')")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("host.target_user must not be empty")]
    EmptyTargetUser,

    #[error("web.workers must be at least 1")]
    NoWorkers,

    #[error("web.create_db requires web.install_postgres")]
    DbWithoutPostgres,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub host: HostSettings,
    pub web: WebSettings,
    pub shell: ShellSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostSettings {
    /// User that owns the application directory and shell configuration
    pub target_user: String,
    /// Upper bound for any single external command
    pub command_timeout_secs: u64,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            target_user: "deploy".to_string(),
            command_timeout_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebSettings {
    pub enabled: bool,
    /// Short name used for the systemd unit and nginx site
    pub app_name: String,
    pub project_dir: String,
    /// Empty means "any host" (server_name _)
    pub domain: String,
    /// Loopback port gunicorn binds and nginx proxies to
    pub bind_port: u16,
    pub workers: u32,
    /// WSGI entry point handed to gunicorn
    pub wsgi_module: String,
    pub secret_key: String,
    pub debug: bool,
    pub install_postgres: bool,
    pub create_db: bool,
    pub db_name: String,
    pub db_user: String,
    /// Empty means peer authentication, no PASSWORD clause
    pub db_password: String,
    pub install_redis: bool,
    pub install_nginx: bool,
    pub configure_firewall: bool,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            app_name: "app".to_string(),
            project_dir: "/srv/app".to_string(),
            domain: String::new(),
            bind_port: 8000,
            workers: 3,
            wsgi_module: "config.wsgi:application".to_string(),
            secret_key: "change-me".to_string(),
            debug: false,
            install_postgres: true,
            create_db: true,
            db_name: "app".to_string(),
            db_user: "app".to_string(),
            db_password: String::new(),
            install_redis: false,
            install_nginx: true,
            configure_firewall: true,
        }
    }
}

/// Which zsh plugin framework to bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellFramework {
    Prezto,
    Antigen,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellSettings {
    pub enabled: bool,
    pub framework: ShellFramework,
    pub history_size: u32,
    pub set_default_shell: bool,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            framework: ShellFramework::Prezto,
            history_size: 50_000,
            set_default_shell: true,
        }
    }
}

impl Settings {
    /// Load settings from an explicit path, or the default location
    ///
    /// An explicit path must exist; the default path falling back to pure
    /// defaults is the supported "no config yet" case.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (
                PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref()),
                true,
            ),
            None => (Self::default_location(), false),
        };

        if !path.exists() {
            if required {
                anyhow::bail!("settings file not found: {}", path.display());
            }
            log::info!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("could not read {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        Ok(settings)
    }

    /// /etc/groundwork.toml, falling back to the invoking user's config
    /// directory (handy for `status` runs before anything is installed)
    fn default_location() -> PathBuf {
        let etc = PathBuf::from(DEFAULT_PATH);
        if etc.exists() {
            return etc;
        }

        dirs::home_dir()
            .map(|home| home.join(".config/groundwork/config.toml"))
            .filter(|p| p.exists())
            .unwrap_or(etc)
    }

    /// Reject values that cannot be provisioned safely
    pub fn validate(&self) -> std::result::Result<(), SettingsError> {
        if self.host.target_user.trim().is_empty() {
            return Err(SettingsError::EmptyTargetUser);
        }

        if self.web.enabled {
            if self.web.workers == 0 {
                return Err(SettingsError::NoWorkers);
            }
            if self.web.create_db && !self.web.install_postgres {
                return Err(SettingsError::DbWithoutPostgres);
            }
            check_identifier("web.app_name", &self.web.app_name)?;
            if self.web.create_db {
                check_identifier("web.db_name", &self.web.db_name)?;
                check_identifier("web.db_user", &self.web.db_user)?;
            }
        }

        Ok(())
    }

    pub fn project_dir(&self) -> PathBuf {
        PathBuf::from(&self.web.project_dir)
    }

    /// Path of the generated environment file
    pub fn env_file_path(&self) -> PathBuf {
        self.project_dir().join(".env")
    }

    pub fn unit_name(&self) -> String {
        format!("{}.service", self.web.app_name)
    }

    pub fn unit_path(&self) -> PathBuf {
        PathBuf::from("/etc/systemd/system").join(self.unit_name())
    }

    pub fn nginx_site_path(&self) -> PathBuf {
        PathBuf::from("/etc/nginx/sites-available").join(&self.web.app_name)
    }

    pub fn nginx_link_path(&self) -> PathBuf {
        PathBuf::from("/etc/nginx/sites-enabled").join(&self.web.app_name)
    }
}

/// Identifiers end up inside SQL statements and unit names; keep them
/// boring.
fn check_identifier(field: &'static str, value: &str) -> std::result::Result<(), SettingsError> {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    let re = IDENT.get_or_init(|| Regex::new("^[a-z_][a-z0-9_]*$").expect("static regex"));

    if re.is_match(value) {
        Ok(())
    } else {
        Err(SettingsError::InvalidIdentifier {
            field,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.host.target_user, "deploy");
        assert_eq!(settings.web.bind_port, 8000);
        assert_eq!(settings.shell.history_size, 50_000);
        assert_eq!(settings.shell.framework, ShellFramework::Prezto);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [web]
            install_redis = true
            db_name = "mydb"
            "#,
        )
        .unwrap();

        assert!(settings.web.install_redis);
        assert_eq!(settings.web.db_name, "mydb");
        // Untouched sections keep their defaults
        assert_eq!(settings.web.bind_port, 8000);
        assert!(settings.shell.enabled);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result: std::result::Result<Settings, _> = toml::from_str(
            r#"
            [web]
            instal_postgres = true
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_hostile_db_name_is_rejected() {
        let mut settings = Settings::default();
        settings.web.db_name = "app'; DROP TABLE users; --".to_string();
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidIdentifier { field: "web.db_name", .. })
        ));
    }

    #[test]
    fn test_create_db_requires_postgres() {
        let mut settings = Settings::default();
        settings.web.install_postgres = false;
        settings.web.create_db = true;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::DbWithoutPostgres)
        ));
    }

    #[test]
    fn test_derived_paths() {
        let settings = Settings::default();
        assert_eq!(settings.unit_name(), "app.service");
        assert_eq!(
            settings.unit_path(),
            PathBuf::from("/etc/systemd/system/app.service")
        );
        assert_eq!(
            settings.env_file_path(),
            PathBuf::from("/srv/app/.env")
        );
    }
}
