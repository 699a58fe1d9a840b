//! Systemd unit template (`/etc/systemd/system/<app>.service`)

use super::managed_banner;
use crate::config::Settings;

pub fn systemd_unit(settings: &Settings) -> String {
    let web = &settings.web;
    let mut out = managed_banner("#");

    let after = if web.install_postgres {
        "network.target postgresql.service"
    } else {
        "network.target"
    };

    out.push_str(&format!(
        "[Unit]\n\
         Description={app} application server\n\
         After={after}\n\
         \n\
         [Service]\n\
         User={user}\n\
         Group={user}\n\
         WorkingDirectory={dir}\n\
         EnvironmentFile={dir}/.env\n\
         ExecStart={dir}/venv/bin/gunicorn --workers {workers} --bind 127.0.0.1:{port} {wsgi}\n\
         Restart=on-failure\n\
         RestartSec=5\n\
         \n\
         [Install]\n\
         WantedBy=multi-user.target\n",
        app = web.app_name,
        after = after,
        user = settings.host.target_user,
        dir = web.project_dir,
        workers = web.workers,
        port = web.bind_port,
        wsgi = web.wsgi_module,
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_fields() {
        let settings = Settings::default();
        let unit = systemd_unit(&settings);

        assert!(unit.contains("Description=app application server\n"));
        assert!(unit.contains("After=network.target postgresql.service\n"));
        assert!(unit.contains("User=deploy\n"));
        assert!(unit.contains("WorkingDirectory=/srv/app\n"));
        assert!(unit.contains("EnvironmentFile=/srv/app/.env\n"));
        assert!(unit.contains(
            "ExecStart=/srv/app/venv/bin/gunicorn --workers 3 --bind 127.0.0.1:8000 config.wsgi:application\n"
        ));
        assert!(unit.contains("Restart=on-failure\n"));
        assert!(unit.contains("WantedBy=multi-user.target\n"));
    }

    #[test]
    fn test_no_postgres_drops_ordering_dependency() {
        let mut settings = Settings::default();
        settings.web.install_postgres = false;

        let unit = systemd_unit(&settings);
        assert!(unit.contains("After=network.target\n"));
        assert!(!unit.contains("postgresql.service"));
    }
}
