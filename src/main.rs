//! Stratify CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stratify::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Init(args) => stratify::cli::commands::init::execute(args, cli.json).await,
        Commands::Plan(args) => {
            stratify::cli::commands::plan::execute(args, config_path, cli.json).await
        }
        Commands::Run(args) => {
            stratify::cli::commands::run::execute(args, config_path, cli.json).await
        }
        Commands::Filter(args) => {
            stratify::cli::commands::filter::execute(args, config_path, cli.json).await
        }
        Commands::Verify(args) => {
            stratify::cli::commands::verify::execute(args, config_path, cli.json).await
        }
    };

    if let Err(err) = result {
        stratify::cli::handle_error(err, cli.json);
    }
}
