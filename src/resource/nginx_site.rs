//! Nginx site resource - vhost file, activation symlink, reload
//!
//! Writing the vhost, linking it into sites-enabled and reloading nginx
//! are one resource: a site is only "present" when nginx is actually
//! serving it, and a reload without a config-test first can take the
//! proxy down.

use anyhow::{Context, Result};
use converge::{ApplyContext, Resource, Satisfaction};
use std::fs;
use std::path::PathBuf;

use crate::fsutil;
use crate::runner::{Cmd, Runner};

/// Stock site shipped by the nginx package; it shadows ours on port 80
const DEFAULT_LINK: &str = "/etc/nginx/sites-enabled/default";

#[derive(Debug, Clone)]
pub struct NginxSite {
    pub name: String,
    /// sites-available path
    pub path: PathBuf,
    /// sites-enabled symlink
    pub link: PathBuf,
    pub content: String,
    runner: Runner,
}

impl NginxSite {
    pub fn new(
        name: &str,
        path: impl Into<PathBuf>,
        link: impl Into<PathBuf>,
        content: String,
        runner: Runner,
    ) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
            link: link.into(),
            content,
            runner,
        }
    }

    fn link_points_at_site(&self) -> bool {
        fs::read_link(&self.link).map(|t| t == self.path).unwrap_or(false)
    }
}

impl Resource for NginxSite {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        format!("Publish nginx site '{}'", self.name)
    }

    fn resource_type(&self) -> &'static str {
        "nginx_site"
    }

    fn probe(&self) -> Result<Satisfaction> {
        let existing = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Satisfaction::Missing);
            }
            Err(e) => {
                return Ok(Satisfaction::Unknown {
                    reason: format!("could not read {}: {e}", self.path.display()),
                });
            }
        };

        let satisfied = existing == self.content
            && self.link_points_at_site()
            && !PathBuf::from(DEFAULT_LINK).exists();

        if satisfied {
            Ok(Satisfaction::Satisfied)
        } else {
            Ok(Satisfaction::Missing)
        }
    }

    fn apply(&self, _ctx: &mut ApplyContext) -> Result<()> {
        fsutil::atomic_write(&self.path, self.content.as_bytes())?;
        fsutil::set_access(&self.path, None, 0o644)?;

        if !self.link_points_at_site() {
            if self.link.is_symlink() {
                fs::remove_file(&self.link)
                    .with_context(|| format!("could not replace {}", self.link.display()))?;
            }
            std::os::unix::fs::symlink(&self.path, &self.link)
                .with_context(|| format!("could not link {}", self.link.display()))?;
        }

        let default_link = PathBuf::from(DEFAULT_LINK);
        if default_link.is_symlink() {
            fs::remove_file(&default_link).context("could not remove the default site")?;
        }

        // Config test before reload; a broken vhost must not reach the
        // running proxy
        self.runner
            .run(&Cmd::new("nginx").arg("-t"))
            .context("nginx config test failed")?;
        self.runner
            .run(&Cmd::new("systemctl").args(["reload", "nginx"]))
            .context("could not reload nginx")?;

        Ok(())
    }
}
