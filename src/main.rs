mod cli;
mod codec;
mod commands;
mod config;
mod engine;
mod error;
mod identity;
mod progress;
mod resource;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    /// Desired-state file
    pub config: PathBuf,
    /// State file
    pub state: PathBuf,
    pub api_base_url: Option<String>,
    pub api_key: Option<String>,
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

    let config = config::expand_path(&cli.config);
    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        state: config::state_path(&config, cli.state.as_deref()),
        config,
        api_base_url: cli.api_base_url,
        api_key: cli.api_key,
    };

    match cli.command {
        Command::Plan(args) => commands::reconcile::plan(&ctx, args.target.as_deref(), args.refresh),
        Command::Apply(args) => commands::reconcile::apply(
            &ctx,
            args.target.as_deref(),
            args.refresh,
            args.yes,
            args.dry_run,
        ),
        Command::Destroy(args) => {
            commands::reconcile::destroy(&ctx, args.target.as_deref(), args.yes)
        }
        Command::Import(args) => commands::import::run(&ctx, args.kind, &args.name, &args.id),
        Command::Refresh { target } => commands::refresh::run(&ctx, target.as_deref()),
        Command::Show { target, json } => commands::show::run(&ctx, target.as_deref(), json),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "kevel", &mut io::stdout());
            Ok(())
        }
    }
}
