//! Stratify - Balanced-Sample Data Loader
//!
//! Stratify pulls paginated records from a remote tabular data API and
//! produces a class-balanced sample: a fixed-size dataset with (as close to)
//! an equal number of records per category of a grouping attribute, without
//! knowing in advance how many categories exist or how the source is
//! ordered. The finalized sample replaces a Postgres table wholesale.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): records, configuration, sample types, and
//!   the page-source / record-sink ports
//! - **Service Layer** (`services`): the sampling core — accumulator,
//!   completion detector, finalizer, reporter — plus the fetch loops
//! - **Adapters** (`adapters`): HTTP page source and Postgres sink
//! - **Infrastructure Layer** (`infrastructure`): configuration loading
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use stratify::adapters::http::DataApiClient;
//! use stratify::services::BalancedSampler;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = stratify::infrastructure::config::ConfigLoader::load()?;
//!     let client = DataApiClient::from_config(&config.api, &config.retry);
//!     let sampler = BalancedSampler::new(client, config.sampling, config.api.page_size);
//!     let outcome = sampler.run().await?;
//!     println!("sampled {} records", outcome.sample.len());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    BalancedSample, CompletionReason, Config, FetchStats, Record, SampleRecord, SamplingConfig,
    UNKNOWN_CATEGORY,
};
pub use domain::ports::{PageSource, RecordSink};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{BalancedSampler, CategoryAccumulator, CompletionDetector, FilteredLoader};
