use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::Record;

/// Port for an offset-paginated record source.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page of records.
    ///
    /// `offset` and `size` form a stable pagination cursor: fixed parameters
    /// yield the same page, and consecutive pages have no gaps or
    /// duplicates. An empty page is returned exactly once, at or after the
    /// true end of data, and signals exhaustion.
    ///
    /// Failures are fatal to the caller; any retry policy lives behind this
    /// port, not in front of it.
    async fn fetch_page(&self, offset: u64, size: u64) -> DomainResult<Vec<Record>>;
}
