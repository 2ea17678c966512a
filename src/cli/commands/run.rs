//! `stratify run` — the balanced sampling pipeline, end to end.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::http::DataApiClient;
use crate::adapters::postgres::{PostgresSink, SinkConnection};
use crate::cli::load_config;
use crate::cli::output::{create_spinner_with_message, format_distribution};
use crate::domain::models::{FetchStats, Record};
use crate::domain::ports::RecordSink;
use crate::services::sampler::{BalancedSampler, RunOutcome};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Fetch and report without uploading to the sink
    #[arg(long)]
    pub dry_run: bool,

    /// Override the configured destination table
    #[arg(long)]
    pub table: Option<String>,
}

pub async fn execute(args: RunArgs, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let table = args
        .table
        .unwrap_or_else(|| config.sampling.destination_table.clone());

    let client = DataApiClient::from_config(&config.api, &config.retry);
    let sampler = BalancedSampler::new(client, config.sampling.clone(), config.api.page_size);

    let outcome = if json {
        sampler.run().await?
    } else {
        let spinner = create_spinner_with_message("Fetching pages...");
        let mut update = |stats: &FetchStats| {
            spinner.set_message(format!(
                "Fetched {} records over {} pages ({} accepted)",
                stats.fetched, stats.pages, stats.accepted
            ));
        };
        let outcome = sampler.run_with_progress(Some(&mut update)).await?;
        spinner.finish_and_clear();
        outcome
    };

    if !json {
        print_report(&outcome);
    }

    if args.dry_run {
        if json {
            println!("{}", serde_json::to_string_pretty(&run_json(&outcome, None))?);
        } else {
            println!("Dry run: skipping upload to '{table}'.");
        }
        return Ok(());
    }

    if outcome.sample.is_empty() {
        if json {
            println!("{}", serde_json::to_string_pretty(&run_json(&outcome, None))?);
        } else {
            println!(
                "{} Sample is empty; nothing to upload.",
                console::style("⚠").yellow().bold()
            );
        }
        return Ok(());
    }

    let connection = SinkConnection::connect(&config.database)
        .await
        .context("Failed to connect to the sink database")?;
    let sink = PostgresSink::new(connection.pool().clone(), config.database.chunk_size);

    let records: Vec<Record> = outcome
        .sample
        .records
        .iter()
        .map(|entry| entry.record.clone())
        .collect();
    let uploaded = sink
        .replace_table(&table, &records)
        .await
        .with_context(|| format!("Failed to replace table '{table}'"))?;

    // Double-check against the sink; the in-memory report is not treated
    // as ground truth.
    let db_count = sink.count_rows(&table).await?;
    let distribution = sink
        .category_distribution(&table, &config.sampling.balance_field, 10)
        .await?;
    connection.close().await;

    if json {
        let mut body = run_json(&outcome, Some(&table));
        body["uploaded"] = serde_json::json!(uploaded);
        body["rows_in_sink"] = serde_json::json!(db_count);
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!(
            "{} Uploaded {} records to '{}' ({} rows verified in sink)",
            console::style("✓").green().bold(),
            uploaded,
            table,
            db_count
        );
        println!("\nDistribution in sink:");
        println!("{}", format_distribution(&distribution));
    }
    Ok(())
}

fn print_report(outcome: &RunOutcome) {
    let report = &outcome.report;
    println!(
        "Sampling finished ({}): {} of {} records, {} categories",
        outcome.completion,
        outcome.sample.len(),
        outcome.sample.target_total,
        report.categories()
    );
    println!(
        "  Fetched {} | accepted {} | dropped {}",
        outcome.stats.fetched, outcome.stats.accepted, outcome.stats.dropped
    );
    println!(
        "  Per category: min {} | max {} | mean {:.1}",
        report.min, report.max, report.mean
    );

    if outcome.sample.shortfall() > 0 {
        println!(
            "{} Sample is {} records short of the target; the smaller sample is still valid.",
            console::style("⚠").yellow().bold(),
            outcome.sample.shortfall()
        );
    }

    let top: Vec<(String, i64)> = report
        .top(10)
        .iter()
        .map(|(category, count)| (category.clone(), *count as i64))
        .collect();
    println!("\nTop categories in sample:");
    println!("{}", format_distribution(&top));
}

fn run_json(outcome: &RunOutcome, table: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "completion": outcome.completion,
        "started_at": outcome.started_at.to_rfc3339(),
        "sample_size": outcome.sample.len(),
        "target_total": outcome.sample.target_total,
        "shortfall": outcome.sample.shortfall(),
        "categories_observed": outcome.categories_observed,
        "stats": outcome.stats,
        "report": outcome.report,
        "destination_table": table,
    })
}
