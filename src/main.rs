mod cli;
mod commands;
mod config;
mod fsutil;
mod plan;
mod precondition;
mod progress;
mod resource;
mod runner;
mod sysuser;
mod templates;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Commands};
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Status(args) => {
            let env = commands::load_env(cli.config.as_deref())?;
            commands::status::run(&ctx, &env, args.target.as_deref(), args.json)
        }
        Commands::Plan(args) => {
            let env = commands::load_env(cli.config.as_deref())?;
            commands::plan::run(&ctx, &env, args.target.as_deref())
        }
        Commands::Apply(args) => {
            let env = commands::load_env(cli.config.as_deref())?;
            commands::apply::run(&ctx, &env, &args)
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "groundwork", &mut io::stdout());
            Ok(())
        }
    }
}
