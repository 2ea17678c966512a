//! `stratify init` — write a configuration skeleton.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;

use crate::domain::models::Config;

const CONFIG_DIR: &str = ".stratify";
const CONFIG_FILE: &str = ".stratify/config.yaml";

const HEADER: &str = "\
# stratify configuration.
#
# Values here are merged over built-in defaults and can themselves be
# overridden by .stratify/local.yaml and STRATIFY_* environment variables
# (e.g. STRATIFY_SAMPLING__TARGET_TOTAL=10000). Keep the database URL out
# of this file: set STRATIFY_DATABASE__URL or use local.yaml.
";

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

pub async fn execute(args: InitArgs, json: bool) -> Result<()> {
    let path = Path::new(CONFIG_FILE);
    if path.exists() && !args.force {
        bail!("{CONFIG_FILE} already exists (use --force to overwrite)");
    }

    fs::create_dir_all(CONFIG_DIR).context("Failed to create .stratify directory")?;
    let body =
        serde_yaml::to_string(&Config::default()).context("Failed to serialize defaults")?;
    fs::write(path, format!("{HEADER}\n{body}"))
        .with_context(|| format!("Failed to write {CONFIG_FILE}"))?;

    if json {
        println!("{}", serde_json::json!({ "created": CONFIG_FILE }));
    } else {
        println!(
            "{} Wrote {}",
            console::style("✓").green().bold(),
            CONFIG_FILE
        );
        println!("  Set STRATIFY_DATABASE__URL before running `stratify run`.");
    }
    Ok(())
}
