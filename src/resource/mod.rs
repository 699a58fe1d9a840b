//! Concrete resources
//!
//! Each submodule implements `converge::Resource` for one kind of
//! desired host state. Resources carry everything they need (rendered
//! content, resolved ownership, a command runner) from plan-build time,
//! so probes stay read-only and actions never consult ambient state.

pub mod config_file;
pub mod default_shell;
pub mod directory;
pub mod file_download;
pub mod firewall_rule;
pub mod git_clone;
pub mod nginx_site;
pub mod package_set;
pub mod pg_database;
pub mod pg_role;
pub mod service;

pub use config_file::ConfigFile;
pub use default_shell::DefaultShell;
pub use directory::Directory;
pub use file_download::FileDownload;
pub use firewall_rule::FirewallRule;
pub use git_clone::GitClone;
pub use nginx_site::NginxSite;
pub use package_set::PackageSet;
pub use pg_database::PgDatabase;
pub use pg_role::PgRole;
pub use service::SystemdService;
