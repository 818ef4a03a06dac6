//! Stepwise CLI - versioned schema migrations guarded by conditional writes

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;
mod context;

use cli::{Cli, Commands};
use commands::{baseline, generate, migrate, reset, status};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Baseline(args) => baseline::execute(args, &cli.global),
        Commands::Migrate(args) => migrate::execute(args, &cli.global),
        Commands::Reset(args) => reset::execute(args, &cli.global),
        Commands::Status(args) => status::execute(args, &cli.global),
        Commands::Generate(args) => generate::execute(args, &cli.global),
    }
}

/// `info` by default, `debug` with `--verbose`; `RUST_LOG` overrides both.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
