//! `stratify filter` — identifier-pool filtered load.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::http::DataApiClient;
use crate::adapters::postgres::{PostgresSink, SinkConnection};
use crate::cli::load_config;
use crate::domain::ports::RecordSink;
use crate::services::filter_loader::FilteredLoader;

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Table whose distinct identifiers form the matching pool
    #[arg(long)]
    pub from_table: String,

    /// Destination table for the matching records
    #[arg(long)]
    pub into_table: String,

    /// Identifier column (defaults to sampling.id_field)
    #[arg(long)]
    pub id_column: Option<String>,
}

pub async fn execute(args: FilterArgs, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let id_column = args
        .id_column
        .or_else(|| config.sampling.id_field.clone())
        .context("No identifier column: pass --id-column or set sampling.id_field")?;

    let connection = SinkConnection::connect(&config.database)
        .await
        .context("Failed to connect to the sink database")?;
    let sink = PostgresSink::new(connection.pool().clone(), config.database.chunk_size);

    let pool: HashSet<String> = sink
        .distinct_values(&args.from_table, &id_column)
        .await
        .with_context(|| format!("Failed to load identifiers from '{}'", args.from_table))?
        .into_iter()
        .collect();
    if !json {
        println!("Loaded {} identifiers from '{}'", pool.len(), args.from_table);
    }

    let client = DataApiClient::from_config(&config.api, &config.retry);
    let loader = FilteredLoader::new(client, id_column, pool, config.api.page_size)
        .with_max_records(config.sampling.max_records)
        .with_log_interval(config.sampling.log_interval);
    let outcome = loader.run().await?;

    if outcome.records.is_empty() {
        connection.close().await;
        if json {
            println!(
                "{}",
                serde_json::json!({ "matched": 0, "fetched": outcome.stats.fetched })
            );
        } else {
            println!(
                "{} No matching rows found!",
                console::style("⚠").yellow().bold()
            );
        }
        return Ok(());
    }

    let uploaded = sink
        .replace_table(&args.into_table, &outcome.records)
        .await
        .with_context(|| format!("Failed to replace table '{}'", args.into_table))?;
    let db_count = sink.count_rows(&args.into_table).await?;
    connection.close().await;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "completion": outcome.completion,
                "stats": outcome.stats,
                "uploaded": uploaded,
                "rows_in_sink": db_count,
                "destination_table": args.into_table,
            }))?
        );
    } else {
        let pct = if outcome.stats.fetched > 0 {
            outcome.stats.accepted as f64 / outcome.stats.fetched as f64 * 100.0
        } else {
            0.0
        };
        println!(
            "Matched {} / {} fetched records ({pct:.1}%)",
            outcome.stats.accepted, outcome.stats.fetched
        );
        println!(
            "{} Uploaded {} rows to '{}' ({} verified in sink)",
            console::style("✓").green().bold(),
            uploaded,
            args.into_table,
            db_count
        );
    }
    Ok(())
}
