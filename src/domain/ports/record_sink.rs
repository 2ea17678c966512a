use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::Record;

/// Port for the bulk tabular sink.
///
/// The sink accepts a finite, finalized, in-memory record set and replaces a
/// named destination table wholesale; no incremental or append contract is
/// offered. The remaining operations exist for post-upload verification and
/// for building identifier pools.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Replace `table` with the given uniformly-keyed records.
    ///
    /// Returns the number of rows written.
    async fn replace_table(&self, table: &str, records: &[Record]) -> DomainResult<u64>;

    /// Count rows currently in `table`.
    async fn count_rows(&self, table: &str) -> DomainResult<i64>;

    /// Top `limit` values of `column` in `table` by row count, descending.
    async fn category_distribution(
        &self,
        table: &str,
        column: &str,
        limit: i64,
    ) -> DomainResult<Vec<(String, i64)>>;

    /// Distinct non-null values of `column` in `table`.
    async fn distinct_values(&self, table: &str, column: &str) -> DomainResult<Vec<String>>;
}
