//! File download resource - single-file bootstrap scripts

use anyhow::{Context, Result};
use converge::{ApplyContext, Resource, Satisfaction};
use std::path::PathBuf;

use crate::fsutil;
use crate::sysuser::Owner;

/// Downloads are capped; these are shell bootstrap scripts, not archives
const MAX_BODY_SIZE: u64 = 10 * 1024 * 1024;

/// A file fetched over HTTP into a fixed destination
///
/// The probe checks presence only - the upstream file is a moving target
/// and re-downloading on every content mismatch would never converge.
#[derive(Debug, Clone)]
pub struct FileDownload {
    pub url: String,
    pub dest: PathBuf,
    pub owner: Option<Owner>,
    pub mode: u32,
}

impl FileDownload {
    pub fn new(url: &str, dest: impl Into<PathBuf>, owner: Option<Owner>, mode: u32) -> Self {
        Self {
            url: url.to_string(),
            dest: dest.into(),
            owner,
            mode,
        }
    }
}

impl Resource for FileDownload {
    fn id(&self) -> String {
        self.dest.display().to_string()
    }

    fn description(&self) -> String {
        format!("Download {} to {}", self.url, self.dest.display())
    }

    fn resource_type(&self) -> &'static str {
        "file_download"
    }

    fn probe(&self) -> Result<Satisfaction> {
        if self.dest.is_file() {
            Ok(Satisfaction::Satisfied)
        } else {
            Ok(Satisfaction::Missing)
        }
    }

    fn apply(&self, _ctx: &mut ApplyContext) -> Result<()> {
        let agent = ureq::Agent::new_with_defaults();

        let mut response = agent
            .get(&self.url)
            .header("User-Agent", "groundwork")
            .call()
            .with_context(|| format!("download failed: {}", self.url))?;

        let bytes = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_SIZE)
            .read_to_vec()
            .with_context(|| format!("could not read response body from {}", self.url))?;

        fsutil::atomic_write(&self.dest, &bytes)?;
        fsutil::set_access(&self.dest, self.owner.as_ref(), self.mode)?;
        Ok(())
    }
}
