//! Command-line interface.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

#[derive(Parser)]
#[command(
    name = "stratify",
    version,
    about = "Balanced-sample data loader for paginated tabular APIs"
)]
pub struct Cli {
    /// Emit machine-readable JSON instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of .stratify/
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a configuration skeleton to .stratify/config.yaml
    Init(commands::init::InitArgs),
    /// Show the quota arithmetic for the configured run
    Plan(commands::plan::PlanArgs),
    /// Fetch, balance, upload, and verify a sample
    Run(commands::run::RunArgs),
    /// Load records whose identifier matches an existing table
    Filter(commands::filter::FilterArgs),
    /// Check row count and category distribution in the sink
    Verify(commands::verify::VerifyArgs),
}

/// Load configuration, honoring the global `--config` override.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Print a fatal error and exit non-zero.
pub fn handle_error(err: anyhow::Error, json: bool) {
    if json {
        println!("{}", serde_json::json!({ "error": format!("{err:#}") }));
    } else {
        eprintln!("{} {err:#}", console::style("error:").red().bold());
    }
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["stratify", "plan", "--json"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Plan(_)));
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::parse_from(["stratify", "run", "--dry-run", "--table", "t2"]);
        match cli.command {
            Commands::Run(args) => {
                assert!(args.dry_run);
                assert_eq!(args.table.as_deref(), Some("t2"));
            }
            _ => panic!("expected run command"),
        }
    }
}
