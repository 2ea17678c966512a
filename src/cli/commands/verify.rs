//! `stratify verify` — sink-side verification of an uploaded table.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::postgres::{PostgresSink, SinkConnection};
use crate::cli::load_config;
use crate::cli::output::format_distribution;
use crate::domain::ports::RecordSink;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Table to inspect (defaults to sampling.destination_table)
    #[arg(long)]
    pub table: Option<String>,

    /// Grouping column (defaults to sampling.balance_field)
    #[arg(long)]
    pub column: Option<String>,

    /// How many categories to show
    #[arg(long, default_value_t = 10)]
    pub top: i64,
}

pub async fn execute(args: VerifyArgs, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let table = args
        .table
        .unwrap_or_else(|| config.sampling.destination_table.clone());
    let column = args
        .column
        .unwrap_or_else(|| config.sampling.balance_field.clone());

    let connection = SinkConnection::connect(&config.database)
        .await
        .context("Failed to connect to the sink database")?;
    let sink = PostgresSink::new(connection.pool().clone(), config.database.chunk_size);

    let count = sink
        .count_rows(&table)
        .await
        .with_context(|| format!("Failed to count rows in '{table}'"))?;
    let distribution = sink.category_distribution(&table, &column, args.top).await?;
    connection.close().await;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "table": table,
                "rows": count,
                "column": column,
                "distribution": distribution,
            }))?
        );
    } else {
        println!("{count} rows in '{table}'");
        println!("\nDistribution by '{column}':");
        println!("{}", format_distribution(&distribution));
    }
    Ok(())
}
