//! Filesystem helpers shared by file-ish resources
//!
//! Writes are atomic: full content goes to a temp file in the target
//! directory, which is then renamed into place. Ownership and permission
//! bits are set explicitly afterwards - files carrying secrets must not
//! depend on the process umask.

use crate::sysuser::Owner;
use anyhow::{Context, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write complete content, then rename into place
///
/// A crash mid-write leaves either the previous file or no file - never a
/// truncated target.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("no parent directory for {}", path.display()))?;
    fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;

    // Temp file must live on the same filesystem as the target or the
    // rename stops being atomic.
    let tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temp file in {}", parent.display()))?;
    fs::write(tmp.path(), content)
        .with_context(|| format!("failed to write {}", tmp.path().display()))?;
    tmp.persist(path)
        .with_context(|| format!("failed to move into place: {}", path.display()))?;

    Ok(())
}

/// Set owner (when given) and permission bits on an existing path
pub fn set_access(path: &Path, owner: Option<&Owner>, mode: u32) -> Result<()> {
    if let Some(owner) = owner {
        std::os::unix::fs::chown(path, Some(owner.uid), Some(owner.gid))
            .with_context(|| format!("failed to chown {}", path.display()))?;
    }

    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("failed to chmod {}", path.display()))?;

    Ok(())
}

/// Permission bits of a path, masked to the mode bits we manage
pub fn mode_bits(path: &Path) -> Result<u32> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?;
    Ok(metadata.permissions().mode() & 0o7777)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_write_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b/file.txt");

        atomic_write(&target, b"hello").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "hello");
    }

    #[test]
    fn test_atomic_write_replaces_whole_content() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("file.txt");

        atomic_write(&target, b"first version, quite long").unwrap();
        atomic_write(&target, b"second").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "second");
    }

    #[test]
    fn test_set_access_mode() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("secret");
        atomic_write(&target, b"x").unwrap();

        set_access(&target, None, 0o600).unwrap();
        assert_eq!(mode_bits(&target).unwrap(), 0o600);
    }
}
