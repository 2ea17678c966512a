//! Domain models: records, configuration, and sample types.

pub mod config;
pub mod record;
pub mod sample;

pub use config::{
    ApiConfig, Config, DatabaseConfig, LoggingConfig, RetryConfig, SamplingConfig,
};
pub use record::{Record, UNKNOWN_CATEGORY};
pub use sample::{BalancedSample, CompletionReason, FetchStats, SampleRecord};
