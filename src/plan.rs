//! Plan builder - settings in, ordered resource list out
//!
//! A pure function of the validated settings plus the target user's
//! passwd entry: same inputs, identical plan. Feature flags are resolved
//! here in full; the reconciler only ever sees the resulting list.
//!
//! Ordering constraints are encoded as literal list position:
//! packages before the services they provide, the database server before
//! its roles, roles before databases, directories before files inside
//! them, the environment file and unit file before the service that
//! reads them at start.

use std::path::Path;

use converge::Plan;

use crate::config::{Settings, ShellFramework};
use crate::resource::{
    ConfigFile, DefaultShell, Directory, FileDownload, FirewallRule, GitClone, NginxSite,
    PackageSet, PgDatabase, PgRole, SystemdService,
};
use crate::runner::Runner;
use crate::sysuser::{Owner, UserEntry};
use crate::templates;

const PREZTO_URL: &str = "https://github.com/sorin-ionescu/prezto.git";
const ANTIGEN_URL: &str =
    "https://raw.githubusercontent.com/zsh-users/antigen/master/bin/antigen.zsh";
const ZSH_PATH: &str = "/usr/bin/zsh";

/// Build the full plan for one host
pub fn build(settings: &Settings, user: &UserEntry, runner: Runner) -> Plan {
    let mut builder = Builder {
        plan: Plan::new(),
        index_refreshed: false,
        runner,
    };

    if settings.web.enabled {
        add_web(&mut builder, settings, user);
    }
    if settings.shell.enabled {
        add_shell(&mut builder, settings, user);
    }

    builder.plan
}

struct Builder {
    plan: Plan,
    index_refreshed: bool,
    runner: Runner,
}

impl Builder {
    /// The first package set of a run also refreshes the apt index
    fn package_set(&mut self, name: &str, packages: &[&str]) {
        let mut set = PackageSet::new(name, packages, self.runner);
        if !self.index_refreshed {
            set = set.with_index_refresh();
            self.index_refreshed = true;
        }
        self.plan.push(Box::new(set));
    }
}

fn add_web(builder: &mut Builder, settings: &Settings, user: &UserEntry) {
    let web = &settings.web;
    let owner = Owner::from(user);
    let runner = builder.runner;

    builder.package_set(
        "python",
        &["python3", "python3-venv", "python3-pip", "build-essential"],
    );

    if web.install_postgres {
        builder.package_set("postgres", &["postgresql", "postgresql-contrib", "libpq-dev"]);
        builder
            .plan
            .push(Box::new(SystemdService::new("postgresql", runner)));

        if web.create_db {
            let password = (!web.db_password.is_empty()).then_some(web.db_password.as_str());
            builder
                .plan
                .push(Box::new(PgRole::new(&web.db_user, password, runner)));
            builder
                .plan
                .push(Box::new(PgDatabase::new(&web.db_name, &web.db_user, runner)));
        }
    }

    if web.install_redis {
        builder.package_set("redis", &["redis-server"]);
        builder
            .plan
            .push(Box::new(SystemdService::new("redis-server", runner)));
    }

    builder.plan.push(Box::new(Directory::new(
        settings.project_dir(),
        Some(owner.clone()),
        0o755,
    )));

    // Owner-only: the environment file carries the secret key and
    // database password
    builder.plan.push(Box::new(ConfigFile::new(
        settings.env_file_path(),
        templates::env_file(settings),
        Some(owner),
        0o600,
    )));

    builder.plan.push(Box::new(ConfigFile::new(
        settings.unit_path(),
        templates::systemd_unit(settings),
        None,
        0o644,
    )));

    // Best-effort: the unit is in place but application code may not be
    // deployed yet, so a failing start must not sink the run
    builder.plan.push(Box::new(
        SystemdService::new(&web.app_name, runner)
            .with_daemon_reload()
            .tolerated(),
    ));

    if web.install_nginx {
        builder.package_set("nginx", &["nginx"]);
        builder
            .plan
            .push(Box::new(SystemdService::new("nginx", runner)));
        builder.plan.push(Box::new(NginxSite::new(
            &web.app_name,
            settings.nginx_site_path(),
            settings.nginx_link_path(),
            templates::nginx_site(settings),
            runner,
        )));
    }

    if web.configure_firewall {
        builder
            .plan
            .push(Box::new(FirewallRule::new("OpenSSH", runner)));
        let web_rule = if web.install_nginx {
            "Nginx Full".to_string()
        } else {
            format!("{}/tcp", web.bind_port)
        };
        builder
            .plan
            .push(Box::new(FirewallRule::new(&web_rule, runner)));
    }
}

fn add_shell(builder: &mut Builder, settings: &Settings, user: &UserEntry) {
    let shell = &settings.shell;
    let owner = Owner::from(user);
    let home = Path::new(&user.home);
    let runner = builder.runner;

    builder.package_set("zsh", &["zsh", "git"]);

    match shell.framework {
        ShellFramework::Prezto => {
            builder.plan.push(Box::new(
                GitClone::new(PREZTO_URL, home.join(".zprezto"), &user.name, runner)
                    .with_submodules(),
            ));
        }
        ShellFramework::Antigen => {
            builder.plan.push(Box::new(Directory::new(
                home.join(".antigen"),
                Some(owner.clone()),
                0o755,
            )));
            builder.plan.push(Box::new(FileDownload::new(
                ANTIGEN_URL,
                home.join(".antigen/antigen.zsh"),
                Some(owner.clone()),
                0o644,
            )));
        }
    }

    builder.plan.push(Box::new(ConfigFile::new(
        home.join(".zshrc"),
        templates::zshrc(settings),
        Some(owner),
        0o644,
    )));

    if shell.set_default_shell {
        builder
            .plan
            .push(Box::new(DefaultShell::new(&user.name, ZSH_PATH, runner)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_user() -> UserEntry {
        UserEntry {
            name: "alice".to_string(),
            uid: 1001,
            gid: 1001,
            home: "/home/alice".to_string(),
            shell: "/bin/bash".to_string(),
        }
    }

    fn build_ids(settings: &Settings) -> Vec<(String, String)> {
        let runner = Runner::new(Duration::from_secs(1));
        build(settings, &test_user(), runner)
            .iter()
            .map(|r| (r.resource_type().to_string(), r.id()))
            .collect()
    }

    fn position(ids: &[(String, String)], rtype: &str, id: &str) -> usize {
        ids.iter()
            .position(|(t, i)| t == rtype && i == id)
            .unwrap_or_else(|| panic!("plan missing {rtype}:{id}"))
    }

    #[test]
    fn test_build_is_deterministic() {
        let settings = Settings::default();
        assert_eq!(build_ids(&settings), build_ids(&settings));
    }

    #[test]
    fn test_postgres_scenario_ordering() {
        let mut settings = Settings::default();
        settings.web.install_postgres = true;
        settings.web.create_db = true;
        settings.web.db_name = "mydb".to_string();
        settings.web.db_user = "alice".to_string();

        let ids = build_ids(&settings);

        let pkgs = position(&ids, "package_set", "postgres");
        let service = position(&ids, "service", "postgresql");
        let role = position(&ids, "pg_role", "alice");
        let db = position(&ids, "pg_database", "mydb");
        let env = position(&ids, "config_file", "/srv/app/.env");

        assert!(pkgs < service, "packages before service");
        assert!(service < role, "server running before role creation");
        assert!(role < db, "role before database");
        assert!(db < env, "database before the env file that references it");

        let env_content = templates::env_file(&settings);
        assert!(env_content.contains("DATABASE_URL=postgres://alice@127.0.0.1:5432/mydb"));
    }

    #[test]
    fn test_nginx_disabled_has_no_nginx_resources() {
        let mut settings = Settings::default();
        settings.web.install_nginx = false;

        let ids = build_ids(&settings);
        assert!(
            !ids.iter()
                .any(|(t, i)| t == "nginx_site" || i == "nginx" || i == "Nginx Full"),
            "unexpected nginx resource in {ids:?}"
        );
        // Firewall falls back to opening the app port directly
        position(&ids, "firewall_rule", "8000/tcp");
    }

    #[test]
    fn test_files_come_after_their_directory() {
        let settings = Settings::default();
        let ids = build_ids(&settings);

        let dir = position(&ids, "directory", "/srv/app");
        let env = position(&ids, "config_file", "/srv/app/.env");
        assert!(dir < env);
    }

    #[test]
    fn test_unit_file_before_app_service() {
        let settings = Settings::default();
        let ids = build_ids(&settings);

        let unit = position(&ids, "config_file", "/etc/systemd/system/app.service");
        let service = position(&ids, "service", "app");
        assert!(unit < service);
    }

    #[test]
    fn test_app_service_is_best_effort() {
        let settings = Settings::default();
        let runner = Runner::new(Duration::from_secs(1));
        let plan = build(&settings, &test_user(), runner);

        let app = plan
            .iter()
            .find(|r| r.resource_type() == "service" && r.id() == "app")
            .expect("app service in plan");
        assert!(app.best_effort());

        // Everything else is required
        for resource in plan.iter() {
            if resource.id() != "app" {
                assert!(!resource.best_effort(), "{} should be required", resource.id());
            }
        }
    }

    #[test]
    fn test_shell_only_plan() {
        let mut settings = Settings::default();
        settings.web.enabled = false;

        let ids = build_ids(&settings);
        position(&ids, "package_set", "zsh");
        position(&ids, "git_clone", "/home/alice/.zprezto");
        position(&ids, "config_file", "/home/alice/.zshrc");
        position(&ids, "default_shell", "alice");
        assert!(!ids.iter().any(|(t, _)| t == "pg_role"));
    }

    #[test]
    fn test_antigen_downloads_instead_of_cloning() {
        let mut settings = Settings::default();
        settings.web.enabled = false;
        settings.shell.framework = ShellFramework::Antigen;

        let ids = build_ids(&settings);
        position(&ids, "file_download", "/home/alice/.antigen/antigen.zsh");
        assert!(!ids.iter().any(|(t, _)| t == "git_clone"));
    }
}
