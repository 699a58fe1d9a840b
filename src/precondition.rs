//! Preconditions checked before anything mutates
//!
//! Both checks are fatal: provisioning as a non-root user cannot install
//! packages or write under /etc, and every ownership decision hangs off
//! the target user's passwd entry.

use crate::runner::Runner;
use crate::sysuser::{self, UserEntry};
use thiserror::Error;

/// Violated precondition; nothing has been changed yet
#[derive(Debug, Error)]
pub enum PreconditionError {
    #[error("must run as root (effective uid {euid}); re-run with sudo")]
    NotRoot { euid: u32 },

    #[error("target user '{user}' does not exist; create it first")]
    MissingUser { user: String },

    #[error("could not inspect target user '{user}': {reason}")]
    Lookup { user: String, reason: String },
}

/// Effective uid of this process
fn effective_uid() -> u32 {
    // SAFETY: geteuid has no failure modes and touches no memory
    unsafe { libc::geteuid() }
}

/// Verify privilege level and target user existence
///
/// Returns the target user's passwd entry for ownership resolution.
pub fn check(runner: &Runner, target_user: &str) -> Result<UserEntry, PreconditionError> {
    let euid = effective_uid();
    if euid != 0 {
        return Err(PreconditionError::NotRoot { euid });
    }

    match sysuser::lookup(runner, target_user) {
        Ok(Some(entry)) => Ok(entry),
        Ok(None) => Err(PreconditionError::MissingUser {
            user: target_user.to_string(),
        }),
        Err(source) => Err(PreconditionError::Lookup {
            user: target_user.to_string(),
            reason: format!("{source:#}"),
        }),
    }
}
