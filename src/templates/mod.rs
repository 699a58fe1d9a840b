//! Rendered configuration files
//!
//! Each generated file has one template function: a pure function of the
//! settings struct, unit-testable with no filesystem access. The rendered
//! string is what the corresponding file resource writes byte-for-byte.

pub mod env;
pub mod nginx;
pub mod systemd;
pub mod zshrc;

pub use env::env_file;
pub use nginx::nginx_site;
pub use systemd::systemd_unit;
pub use zshrc::zshrc;

/// Header line shared by all generated files
///
/// The comment leader varies by file syntax, so callers pass it in.
fn managed_banner(comment: &str) -> String {
    format!("{comment} Managed by groundwork - manual edits will be overwritten\n")
}
