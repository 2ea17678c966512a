//! Finalized sample and run accounting types.

use serde::Serialize;

use super::record::Record;

/// A finalized record, still tagged with the category it was accepted under.
///
/// The tag matters for records in the synthetic `"Unknown"` category, whose
/// raw fields carry no readable grouping value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRecord {
    pub category: String,
    pub record: Record,
}

/// The finalized, class-balanced output of a sampling run.
///
/// Records appear in deterministic finalization order: fair shares in
/// category-discovery order, then backfill in the same order.
#[derive(Debug, Clone, Serialize)]
pub struct BalancedSample {
    pub records: Vec<SampleRecord>,
    /// The size the run was asked to produce.
    pub target_total: usize,
}

impl BalancedSample {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// How many records short of the target the sample is. A shortfall is
    /// reported, not raised: the smaller sample is still valid output.
    pub fn shortfall(&self) -> usize {
        self.target_total.saturating_sub(self.records.len())
    }
}

/// Why a fetch loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// Every expected category reached its quota.
    QuotaMet,
    /// The source returned an empty page.
    SourceExhausted,
    /// The configured `max_records` cap was reached.
    FetchCapReached,
}

impl std::fmt::Display for CompletionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaMet => write!(f, "quota met"),
            Self::SourceExhausted => write!(f, "source exhausted"),
            Self::FetchCapReached => write!(f, "fetch cap reached"),
        }
    }
}

/// Counters accumulated over a fetch loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FetchStats {
    /// Pages fetched, empty terminal page excluded.
    pub pages: u64,
    /// Records received from the source.
    pub fetched: u64,
    /// Records retained (accepted into a buffer, or matched by a filter).
    pub accepted: u64,
    /// Records dropped (over quota, duplicate identifier, or unmatched).
    pub dropped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortfall() {
        let sample = BalancedSample {
            records: vec![],
            target_total: 10,
        };
        assert_eq!(sample.shortfall(), 10);
        assert!(sample.is_empty());
    }

    #[test]
    fn test_completion_reason_serializes_snake_case() {
        let json = serde_json::to_string(&CompletionReason::SourceExhausted).unwrap();
        assert_eq!(json, "\"source_exhausted\"");
    }
}
