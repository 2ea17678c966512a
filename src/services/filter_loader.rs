//! Identifier-pool filtered loading.
//!
//! The sibling workflow to balanced sampling: fetch every page, keep only
//! records whose identifier appears in a pre-loaded pool (typically the
//! distinct identifiers of an existing sink table), and hand the matches to
//! the sink wholesale. No quotas, no balancing — just set membership, with
//! an optional cap on total fetched records.

use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{CompletionReason, FetchStats, Record};
use crate::domain::ports::PageSource;

/// Outcome of a filtered load.
#[derive(Debug)]
pub struct FilterOutcome {
    /// Matching records in arrival order.
    pub records: Vec<Record>,
    pub stats: FetchStats,
    pub completion: CompletionReason,
}

/// Fetches pages and retains records matching an identifier pool.
pub struct FilteredLoader<S> {
    source: S,
    id_field: String,
    pool: HashSet<String>,
    page_size: u64,
    max_records: Option<u64>,
    log_interval: u64,
}

impl<S: PageSource> FilteredLoader<S> {
    pub fn new(
        source: S,
        id_field: impl Into<String>,
        pool: HashSet<String>,
        page_size: u64,
    ) -> Self {
        Self {
            source,
            id_field: id_field.into(),
            pool,
            page_size,
            max_records: None,
            log_interval: 10_000,
        }
    }

    /// Cap the total number of fetched records.
    pub fn with_max_records(mut self, cap: Option<u64>) -> Self {
        self.max_records = cap;
        self
    }

    pub fn with_log_interval(mut self, interval: u64) -> Self {
        self.log_interval = interval;
        self
    }

    /// Records without a readable identifier never match.
    fn matches(&self, record: &Record) -> bool {
        record
            .identifier(&self.id_field)
            .is_some_and(|id| self.pool.contains(&id))
    }

    pub async fn run(&self) -> DomainResult<FilterOutcome> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::info!(
            %run_id,
            pool_size = self.pool.len(),
            id_field = %self.id_field,
            "starting filtered load"
        );

        let mut records = Vec::new();
        let mut stats = FetchStats::default();
        let mut offset = 0u64;
        let mut next_log = self.log_interval;

        let completion = loop {
            let page = self.source.fetch_page(offset, self.page_size).await?;
            if page.is_empty() {
                break CompletionReason::SourceExhausted;
            }

            stats.pages += 1;
            stats.fetched += page.len() as u64;
            for record in page {
                if self.matches(&record) {
                    records.push(record);
                    stats.accepted += 1;
                } else {
                    stats.dropped += 1;
                }
            }

            if self.log_interval > 0 {
                while stats.fetched >= next_log {
                    tracing::info!(
                        %run_id,
                        fetched = stats.fetched,
                        matched = stats.accepted,
                        "filtered load progress"
                    );
                    next_log += self.log_interval;
                }
            }

            if let Some(cap) = self.max_records {
                if stats.fetched >= cap {
                    tracing::info!(%run_id, cap, "fetch cap reached");
                    break CompletionReason::FetchCapReached;
                }
            }

            offset += self.page_size;
        };

        tracing::info!(
            %run_id,
            completion = %completion,
            fetched = stats.fetched,
            matched = stats.accepted,
            elapsed_ms = (Utc::now() - started_at).num_milliseconds(),
            "filtered load finished"
        );

        Ok(FilterOutcome {
            records,
            stats,
            completion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct FlatSource {
        records: Vec<Record>,
    }

    #[async_trait]
    impl PageSource for FlatSource {
        async fn fetch_page(&self, offset: u64, size: u64) -> DomainResult<Vec<Record>> {
            let start = (offset as usize).min(self.records.len());
            let end = (start + size as usize).min(self.records.len());
            Ok(self.records[start..end].to_vec())
        }
    }

    fn record(id: serde_json::Value) -> Record {
        let mut r = Record::new();
        r.insert("npi", id);
        r
    }

    fn pool(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_keeps_only_matching_identifiers() {
        let source = FlatSource {
            records: vec![record(json!("1")), record(json!("2")), record(json!("3"))],
        };
        let loader = FilteredLoader::new(source, "npi", pool(&["1", "3"]), 2)
            .with_log_interval(0);

        let outcome = loader.run().await.unwrap();
        assert_eq!(outcome.stats.accepted, 2);
        assert_eq!(outcome.stats.dropped, 1);
        assert_eq!(outcome.completion, CompletionReason::SourceExhausted);
    }

    #[tokio::test]
    async fn test_numeric_identifiers_match_text_pool() {
        // Identifier pools come back from a text column; numeric JSON
        // fields must still match.
        let source = FlatSource {
            records: vec![record(json!(1234567890u64))],
        };
        let loader = FilteredLoader::new(source, "npi", pool(&["1234567890"]), 10)
            .with_log_interval(0);

        let outcome = loader.run().await.unwrap();
        assert_eq!(outcome.stats.accepted, 1);
    }

    #[tokio::test]
    async fn test_missing_identifier_never_matches() {
        let source = FlatSource {
            records: vec![Record::new(), record(json!(""))],
        };
        let loader = FilteredLoader::new(source, "npi", pool(&["1"]), 10)
            .with_log_interval(0);

        let outcome = loader.run().await.unwrap();
        assert_eq!(outcome.stats.accepted, 0);
        assert_eq!(outcome.stats.dropped, 2);
    }

    #[tokio::test]
    async fn test_fetch_cap_stops_loader() {
        let records = (0..100).map(|i| record(json!(i))).collect();
        let loader = FilteredLoader::new(FlatSource { records }, "npi", pool(&["1"]), 10)
            .with_max_records(Some(30))
            .with_log_interval(0);

        let outcome = loader.run().await.unwrap();
        assert_eq!(outcome.completion, CompletionReason::FetchCapReached);
        assert_eq!(outcome.stats.fetched, 30);
    }
}
