//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;

/// Server used when neither `--uri` nor `MONGODB_URI` is given
pub const DEFAULT_URI: &str = "mongodb://localhost:27017";

/// Reconcile MongoDB indexes against a declarative config file
///
/// Without --fetch or --apply, prints the plan and changes nothing.
#[derive(Parser, Debug)]
#[command(name = "indexer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Index config file (.json, .yaml or .yml)
    #[arg(short, long, env = "INDEXER_CONFIG")]
    pub config: PathBuf,

    /// MongoDB connection string
    #[arg(long, env = "MONGODB_URI", default_value = DEFAULT_URI, hide_env_values = true)]
    pub uri: String,

    /// Database whose indexes are managed
    #[arg(short, long, env = "MONGODB_DATABASE")]
    pub database: String,

    /// Write the live indexes to the config file
    #[arg(long, conflicts_with = "apply")]
    pub fetch: bool,

    /// Create and drop indexes so the database matches the config
    #[arg(long)]
    pub apply: bool,

    /// Print the plan as JSON for scripting
    #[arg(long, conflicts_with_all = ["fetch", "apply"])]
    pub json: bool,

    /// Server selection timeout in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// What a run does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Fetch,
    Plan,
    Apply,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.fetch {
            Mode::Fetch
        } else if self.apply {
            Mode::Apply
        } else {
            Mode::Plan
        }
    }
}
