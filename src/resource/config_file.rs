//! Rendered configuration file resource
//!
//! Content is rendered at plan-build time, so the probe is a plain
//! byte-for-byte comparison and two runs with the same settings write
//! identical files.

use anyhow::Result;
use converge::{ApplyContext, Resource, Satisfaction};
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;

use crate::fsutil;
use crate::sysuser::Owner;

#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub content: String,
    pub owner: Option<Owner>,
    pub mode: u32,
}

impl ConfigFile {
    pub fn new(
        path: impl Into<PathBuf>,
        content: String,
        owner: Option<Owner>,
        mode: u32,
    ) -> Self {
        Self {
            path: path.into(),
            content,
            owner,
            mode,
        }
    }
}

impl Resource for ConfigFile {
    fn id(&self) -> String {
        self.path.display().to_string()
    }

    fn description(&self) -> String {
        format!("Write {} (mode {:o})", self.path.display(), self.mode)
    }

    fn resource_type(&self) -> &'static str {
        "config_file"
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

        if existing != self.content {
            return Ok(Satisfaction::Missing);
        }
        if fsutil::mode_bits(&self.path)? != self.mode {
            return Ok(Satisfaction::Missing);
        }
        if let Some(owner) = &self.owner {
            let metadata = fs::metadata(&self.path)?;
            if metadata.uid() != owner.uid || metadata.gid() != owner.gid {
                return Ok(Satisfaction::Missing);
            }
        }

        Ok(Satisfaction::Satisfied)
    }

    fn apply(&self, _ctx: &mut ApplyContext) -> Result<()> {
        fsutil::atomic_write(&self.path, self.content.as_bytes())?;
        fsutil::set_access(&self.path, self.owner.as_ref(), self.mode)?;
        Ok(())
    }
}
