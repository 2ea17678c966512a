//! Balanced sampling run: the page-by-page fetch loop.
//!
//! Wires the page source into the accumulator, checks completion after each
//! page, and finalizes once a terminal condition is reached. Strictly
//! sequential: the page fetch is the only suspend point, and the
//! accumulator is an owned value that lives exactly as long as the run.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    BalancedSample, CompletionReason, FetchStats, SamplingConfig,
};
use crate::domain::ports::PageSource;

use super::accumulator::CategoryAccumulator;
use super::completion::CompletionDetector;
use super::finalizer::finalize;
use super::reporter::{summarize, BalanceReport};

/// Everything a finished sampling run produces.
#[derive(Debug)]
pub struct RunOutcome {
    pub sample: BalancedSample,
    pub report: BalanceReport,
    pub stats: FetchStats,
    pub completion: CompletionReason,
    /// Distinct categories the source produced, accepted or not.
    pub categories_observed: usize,
    pub started_at: DateTime<Utc>,
}

/// Callback invoked as pages are processed, for CLI progress display.
pub type ProgressFn<'a> = dyn FnMut(&FetchStats) + Send + 'a;

/// Drives one balanced sampling run against a page source.
pub struct BalancedSampler<S> {
    source: S,
    sampling: SamplingConfig,
    page_size: u64,
}

impl<S: PageSource> BalancedSampler<S> {
    pub fn new(source: S, sampling: SamplingConfig, page_size: u64) -> Self {
        Self {
            source,
            sampling,
            page_size,
        }
    }

    pub async fn run(&self) -> DomainResult<RunOutcome> {
        self.run_with_progress(None).await
    }

    /// Run the sampling loop, optionally reporting progress after each page.
    ///
    /// Two distinct terminal conditions end the loop: quota completion and
    /// source exhaustion (an empty page). The optional fetch cap is a third,
    /// supplementary stop for capped workflows. The pagination cursor
    /// advances by the requested page size, not the returned length.
    pub async fn run_with_progress(
        &self,
        mut progress: Option<&mut ProgressFn<'_>>,
    ) -> DomainResult<RunOutcome> {
        let quota = self.sampling.records_per_category();
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        tracing::info!(
            %run_id,
            target_total = self.sampling.target_total,
            expected_categories = self.sampling.expected_categories,
            quota,
            remainder = self.sampling.remainder(),
            balance_field = %self.sampling.balance_field,
            "starting balanced sampling run"
        );

        let mut accumulator = CategoryAccumulator::new(
            self.sampling.balance_field.clone(),
            self.sampling.id_field.clone(),
            quota,
        );
        let detector = CompletionDetector::new(self.sampling.expected_categories, quota);
        let mut stats = FetchStats::default();
        let mut offset = 0u64;
        let mut next_log = self.sampling.log_interval;

        let completion = loop {
            let page = self.source.fetch_page(offset, self.page_size).await?;
            if page.is_empty() {
                tracing::info!(%run_id, offset, "source exhausted");
                break CompletionReason::SourceExhausted;
            }

            stats.pages += 1;
            stats.fetched += page.len() as u64;
            for record in page {
                if accumulator.accept(record) {
                    stats.accepted += 1;
                } else {
                    stats.dropped += 1;
                }
            }

            if self.sampling.log_interval > 0 {
                while stats.fetched >= next_log {
                    tracing::info!(
                        %run_id,
                        fetched = stats.fetched,
                        accepted = stats.accepted,
                        dropped = stats.dropped,
                        categories = accumulator.categories_observed(),
                        min_per_category = accumulator.min_count().unwrap_or(0),
                        "sampling progress"
                    );
                    next_log += self.sampling.log_interval;
                }
            }
            if let Some(report) = progress.as_deref_mut() {
                report(&stats);
            }

            if detector.is_complete(&accumulator) {
                tracing::info!(%run_id, fetched = stats.fetched, "all categories reached quota");
                break CompletionReason::QuotaMet;
            }
            if let Some(cap) = self.sampling.max_records {
                if stats.fetched >= cap {
                    tracing::warn!(%run_id, cap, "fetch cap reached before completion");
                    break CompletionReason::FetchCapReached;
                }
            }

            offset += self.page_size;
        };

        let categories_observed = accumulator.categories_observed();
        let sample = finalize(accumulator.buckets(), quota, self.sampling.target_total);
        let report = summarize(&sample);

        tracing::info!(
            %run_id,
            completion = %completion,
            fetched = stats.fetched,
            accepted = stats.accepted,
            sample_size = sample.len(),
            shortfall = sample.shortfall(),
            categories = categories_observed,
            elapsed_ms = (Utc::now() - started_at).num_milliseconds(),
            "balanced sampling run finished"
        );

        Ok(RunOutcome {
            sample,
            report,
            stats,
            completion,
            categories_observed,
            started_at,
        })
    }
}
