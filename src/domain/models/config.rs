use serde::{Deserialize, Serialize};

/// Main configuration structure for stratify
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Data API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Sink database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Balanced sampling configuration
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Retry policy for the page source boundary
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            database: DatabaseConfig::default(),
            sampling: SamplingConfig::default(),
            logging: LoggingConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Data API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApiConfig {
    /// Base URL of the paginated dataset endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Token-bucket rate limit applied to page requests
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
}

fn default_base_url() -> String {
    "https://data.cms.gov/data-api/v1/dataset/0e9f2f2b-7bf9-451a-912c-e02e654dd725/data".to_string()
}

const fn default_page_size() -> u64 {
    1000
}

const fn default_requests_per_minute() -> u32 {
    100
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            requests_per_minute: default_requests_per_minute(),
        }
    }
}

/// Sink database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Postgres connection URL. Usually supplied via
    /// `STRATIFY_DATABASE__URL` rather than committed to config.
    #[serde(default)]
    pub url: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Rows per INSERT batch during table replacement
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_chunk_size() -> usize {
    1000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            chunk_size: default_chunk_size(),
        }
    }
}

/// Balanced sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SamplingConfig {
    /// Total records the finalized sample should contain
    #[serde(default = "default_target_total")]
    pub target_total: usize,

    /// Grouping attribute the sample is balanced across
    #[serde(default = "default_balance_field")]
    pub balance_field: String,

    /// Estimated number of distinct categories in the source.
    ///
    /// This is an estimate, not a measurement. When it overshoots the true
    /// universe, quota-completion can never trigger and the run ends only
    /// when the source is exhausted.
    #[serde(default = "default_expected_categories")]
    pub expected_categories: usize,

    /// Destination table for the finalized sample
    #[serde(default = "default_destination_table")]
    pub destination_table: String,

    /// Identifier column. When set, a record whose identifier was already
    /// accepted is dropped, and filtered loads match against this column.
    #[serde(default)]
    pub id_field: Option<String>,

    /// Hard cap on total fetched records; unset means fetch until the
    /// source is exhausted or quotas are met.
    #[serde(default)]
    pub max_records: Option<u64>,

    /// Emit a progress event every this many fetched records (0 disables)
    #[serde(default = "default_log_interval")]
    pub log_interval: u64,
}

const fn default_target_total() -> usize {
    40_000
}

fn default_balance_field() -> String {
    "Rndrng_Prvdr_Type".to_string()
}

const fn default_expected_categories() -> usize {
    104
}

fn default_destination_table() -> String {
    "balanced_physician_data".to_string()
}

const fn default_log_interval() -> u64 {
    10_000
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            target_total: default_target_total(),
            balance_field: default_balance_field(),
            expected_categories: default_expected_categories(),
            destination_table: default_destination_table(),
            id_field: None,
            max_records: None,
            log_interval: default_log_interval(),
        }
    }
}

impl SamplingConfig {
    /// Per-category quota: `target_total / expected_categories`, integer
    /// division. The remainder is distributed during finalization, not
    /// during accumulation.
    pub fn records_per_category(&self) -> usize {
        self.target_total / self.expected_categories.max(1)
    }

    /// Records left over after every expected category takes its quota.
    pub fn remainder(&self) -> usize {
        self.target_total % self.expected_categories.max(1)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Retry policy for page fetches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts per page
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    1000
}

const fn default_max_backoff_ms() -> u64 {
    60_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_source_dataset() {
        let config = Config::default();
        assert_eq!(config.api.page_size, 1000);
        assert_eq!(config.sampling.target_total, 40_000);
        assert_eq!(config.sampling.expected_categories, 104);
        assert_eq!(config.sampling.balance_field, "Rndrng_Prvdr_Type");
        assert_eq!(config.database.chunk_size, 1000);
    }

    #[test]
    fn test_quota_arithmetic() {
        let sampling = SamplingConfig {
            target_total: 40_000,
            expected_categories: 104,
            ..SamplingConfig::default()
        };
        assert_eq!(sampling.records_per_category(), 384);
        assert_eq!(sampling.remainder(), 40_000 - 384 * 104);
    }

    #[test]
    fn test_quota_sum_never_exceeds_target() {
        for (target, expected) in [(100, 3), (10, 4), (7, 7), (40_000, 104)] {
            let sampling = SamplingConfig {
                target_total: target,
                expected_categories: expected,
                ..SamplingConfig::default()
            };
            assert!(sampling.records_per_category() * expected <= target);
        }
    }
}
