//! `filebox` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration, start logging, open the store.
//! - Run one command per invocation against the persisted tree.
//!
//! # Invariants
//! - Exit code 0 on success, 1 on operation failure, 2 on usage/config errors.
//! - A logging setup failure is reported but never blocks the command.

mod args;
mod commands;
mod error;
mod output;

use args::{Cli, Commands};
use clap::Parser;
use error::CliError;
use filebox_core::{init_logging, open_store, FileSystem, FileboxConfig};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("error: {err}");
        std::process::exit(err.exit_code());
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = FileboxConfig::resolve(cli.overrides())?;
    if let Err(err) = init_logging(config.log_level, &config.log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if cli.command == Commands::Info {
        commands::print_info(&config, &mut out)?;
    } else {
        let store = open_store(&config.store_path, config.quota_bytes)?;
        let mut fs = FileSystem::load(store);
        commands::execute(&cli.command, &mut fs, &config, &mut out)?;
    }
    out.flush().map_err(CliError::Output)
}
