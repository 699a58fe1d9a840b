//! Directory resource - existence plus owner and mode

use anyhow::Result;
use converge::{ApplyContext, Resource, Satisfaction};
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;

use crate::fsutil;
use crate::sysuser::Owner;

#[derive(Debug, Clone)]
pub struct Directory {
    pub path: PathBuf,
    /// None skips the chown (used by tests and root-owned paths)
    pub owner: Option<Owner>,
    pub mode: u32,
}

impl Directory {
    pub fn new(path: impl Into<PathBuf>, owner: Option<Owner>, mode: u32) -> Self {
        Self {
            path: path.into(),
            owner,
            mode,
        }
    }
}

impl Resource for Directory {
    fn id(&self) -> String {
        self.path.display().to_string()
    }

    fn description(&self) -> String {
        match &self.owner {
            Some(owner) => format!(
                "Directory {} (owner {}, mode {:o})",
                self.path.display(),
                owner.name,
                self.mode
            ),
            None => format!("Directory {} (mode {:o})", self.path.display(), self.mode),
        }
    }

    fn resource_type(&self) -> &'static str {
        "directory"
    }

    fn probe(&self) -> Result<Satisfaction> {
        let metadata = match fs::metadata(&self.path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Satisfaction::Missing);
            }
            Err(e) => {
                return Ok(Satisfaction::Unknown {
                    reason: format!("could not stat {}: {e}", self.path.display()),
                });
            }
        };

        if !metadata.is_dir() {
            return Ok(Satisfaction::Missing);
        }
        if metadata.mode() & 0o7777 != self.mode {
            return Ok(Satisfaction::Missing);
        }
        if let Some(owner) = &self.owner
            && (metadata.uid() != owner.uid || metadata.gid() != owner.gid)
        {
            return Ok(Satisfaction::Missing);
        }

        Ok(Satisfaction::Satisfied)
    }

    fn apply(&self, _ctx: &mut ApplyContext) -> Result<()> {
        fs::create_dir_all(&self.path)?;
        fsutil::set_access(&self.path, self.owner.as_ref(), self.mode)?;
        Ok(())
    }
}
