//! System user lookups via getent
//!
//! Owner resolution for files and directories goes through `getent
//! passwd` so probes and actions agree on uid/gid with the rest of the
//! system's name service configuration.

use crate::runner::{Cmd, Runner};
use anyhow::{Context, Result, bail};

/// One passwd entry, as reported by getent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    pub home: String,
    pub shell: String,
}

/// Resolved file ownership, carried by file/directory resources
///
/// Resolved once at plan-build time so probes stay side-effect-free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
}

impl From<&UserEntry> for Owner {
    fn from(entry: &UserEntry) -> Self {
        Self {
            name: entry.name.clone(),
            uid: entry.uid,
            gid: entry.gid,
        }
    }
}

/// Look up a user, returning None when the account does not exist
pub fn lookup(runner: &Runner, name: &str) -> Result<Option<UserEntry>> {
    let output = runner
        .output(&Cmd::new("getent").args(["passwd", name]))
        .context("failed to run getent")?;

    // getent exits 2 when the key is not found
    if !output.success {
        return Ok(None);
    }

    parse_passwd_line(output.stdout_trimmed()).map(Some)
}

/// Parse a `name:x:uid:gid:gecos:home:shell` line
fn parse_passwd_line(line: &str) -> Result<UserEntry> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() < 7 {
        bail!("malformed passwd entry: {line}");
    }

    Ok(UserEntry {
        name: fields[0].to_string(),
        uid: fields[2]
            .parse()
            .with_context(|| format!("bad uid in passwd entry: {}", fields[2]))?,
        gid: fields[3]
            .parse()
            .with_context(|| format!("bad gid in passwd entry: {}", fields[3]))?,
        home: fields[5].to_string(),
        shell: fields[6].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_passwd_line() {
        let entry = parse_passwd_line("deploy:x:1001:1001:Deploy User:/home/deploy:/bin/bash")
            .unwrap();
        assert_eq!(entry.name, "deploy");
        assert_eq!(entry.uid, 1001);
        assert_eq!(entry.gid, 1001);
        assert_eq!(entry.home, "/home/deploy");
        assert_eq!(entry.shell, "/bin/bash");
    }

    #[test]
    fn test_parse_rejects_short_line() {
        assert!(parse_passwd_line("deploy:x:1001").is_err());
    }
}
