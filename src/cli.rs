use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "groundwork")]
#[command(version)]
#[command(about = "Declarative host provisioning - packages, services, databases, shell", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Settings file (default: /etc/groundwork.toml, missing file means
    /// all defaults)
    #[arg(short, long, global = true, env = "GROUNDWORK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe every resource and show what already holds
    Status(StatusArgs),

    /// Print the ordered plan with probe state
    Plan(TargetArgs),

    /// Reconcile the host to the desired state
    Apply(ApplyArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct TargetArgs {
    /// Only resources matching 'type' or 'type.name'
    #[arg(long)]
    pub target: Option<String>,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Only resources matching 'type' or 'type.name'
    #[arg(long)]
    pub target: Option<String>,

    /// Print machine-readable JSON instead of the table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Probe and report only; never invoke an action
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Only resources matching 'type' or 'type.name'
    #[arg(long)]
    pub target: Option<String>,
}
