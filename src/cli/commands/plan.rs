//! `stratify plan` — show the quota arithmetic before fetching anything.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use crate::cli::load_config;

#[derive(Args, Debug)]
pub struct PlanArgs {}

pub async fn execute(_args: PlanArgs, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let sampling = &config.sampling;
    let quota = sampling.records_per_category();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "target_total": sampling.target_total,
                "expected_categories": sampling.expected_categories,
                "records_per_category": quota,
                "remainder": sampling.remainder(),
                "balance_field": sampling.balance_field,
                "source": config.api.base_url,
                "destination_table": sampling.destination_table,
            }))?
        );
    } else {
        println!("Target: {} balanced records", sampling.target_total);
        println!("Expected categories: {}", sampling.expected_categories);
        println!(
            "Records per category: {} (with {} extras)",
            quota,
            sampling.remainder()
        );
        println!("Balance field: {}", sampling.balance_field);
        println!("Source: {}", config.api.base_url);
        println!("Destination: {}", sampling.destination_table);
    }
    Ok(())
}
