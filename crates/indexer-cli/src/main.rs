//! mongo-indexer CLI
//!
//! Fetches, plans and applies MongoDB index changes from a config file.

mod cli;
mod commands;
mod error;
mod logging;
mod render;

use std::io;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use indexer_core::{ConfigFormat, ConfigStore};
use indexer_mongo::MongoCatalog;

use cli::{Cli, Mode};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)
        .map_err(|e| CliError::user(format!("Cannot initialize logging: {e}")))?;

    if cli.database.trim().is_empty() {
        return Err(CliError::user("Database name must not be empty"));
    }

    let store = ConfigStore::new(&cli.config);
    let mut out = io::stdout().lock();

    // Config problems surface before any network I/O.
    match cli.mode() {
        Mode::Fetch => {
            ConfigFormat::from_path(store.path())?;
            let catalog = connect(&cli)?;
            commands::run_fetch(&catalog, &store, &mut out)
        }
        Mode::Plan => {
            let desired = store.load()?;
            let catalog = connect(&cli)?;
            commands::run_plan(&catalog, &desired, cli.json, &mut out)
        }
        Mode::Apply => {
            let desired = store.load()?;
            let catalog = connect(&cli)?;
            commands::run_apply(&catalog, &desired, &mut out)
        }
    }
}

fn connect(cli: &Cli) -> Result<MongoCatalog> {
    tracing::debug!(database = %cli.database, timeout = cli.timeout, "Connecting");
    let catalog = MongoCatalog::connect(&cli.uri, &cli.database, Duration::from_secs(cli.timeout))?;
    Ok(catalog)
}
