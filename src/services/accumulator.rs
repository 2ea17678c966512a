//! Category accumulator: the quota-tracking heart of balanced sampling.
//!
//! Categories are discovered as records arrive; nothing about the category
//! universe is assumed up front. Each category owns a bounded buffer that
//! never grows past the per-category quota, so a run holds at most
//! `quota * categories` records regardless of how skewed the source is.

use std::collections::{HashMap, HashSet};

use crate::domain::models::Record;

/// Per-category buffer and acceptance count.
///
/// The count always equals the buffer length; it exists separately so the
/// completion check stays a counter comparison.
#[derive(Debug, Clone, Default)]
struct CategoryBucket {
    records: Vec<Record>,
    count: usize,
}

/// Accumulates incoming records into per-category, quota-capped buffers.
///
/// The accumulator is an owned value created empty at the start of a run,
/// mutated once per incoming record, and consumed by the finalizer. Only
/// [`accept`](CategoryAccumulator::accept) mutates its state.
#[derive(Debug)]
pub struct CategoryAccumulator {
    /// Grouping attribute records are balanced across.
    balance_field: String,
    /// Optional identifier column for duplicate suppression.
    id_field: Option<String>,
    /// Per-category acceptance cap.
    quota: usize,
    buckets: HashMap<String, CategoryBucket>,
    /// Categories in first-seen order. Finalization iterates this order.
    discovery_order: Vec<String>,
    /// Identifiers already accepted, when `id_field` is set.
    seen_ids: HashSet<String>,
}

impl CategoryAccumulator {
    pub fn new(balance_field: impl Into<String>, id_field: Option<String>, quota: usize) -> Self {
        Self {
            balance_field: balance_field.into(),
            id_field,
            quota,
            buckets: HashMap::new(),
            discovery_order: Vec::new(),
            seen_ids: HashSet::new(),
        }
    }

    /// Offer a record to the accumulator.
    ///
    /// The record's category is registered even when the record itself is
    /// dropped, so the completion check sees every category the source has
    /// produced. A record is accepted iff its category's count is strictly
    /// below the quota and (when an identifier column is configured) its
    /// identifier has not been accepted before. Drops are silent by
    /// contract, not errors.
    pub fn accept(&mut self, record: Record) -> bool {
        let category = record.category(&self.balance_field);

        if !self.buckets.contains_key(&category) {
            self.buckets.insert(category.clone(), CategoryBucket::default());
            self.discovery_order.push(category.clone());
        }

        let identifier = self
            .id_field
            .as_deref()
            .and_then(|field| record.identifier(field));
        if let Some(id) = &identifier {
            if self.seen_ids.contains(id) {
                tracing::debug!(category = %category, "dropping duplicate identifier");
                return false;
            }
        }

        let bucket = self
            .buckets
            .get_mut(&category)
            .expect("bucket registered above");
        if bucket.count >= self.quota {
            return false;
        }

        bucket.records.push(record);
        bucket.count += 1;
        if let Some(id) = identifier {
            self.seen_ids.insert(id);
        }
        true
    }

    /// Number of distinct categories observed so far.
    pub fn categories_observed(&self) -> usize {
        self.discovery_order.len()
    }

    /// Minimum acceptance count across observed categories; `None` before
    /// any category has been seen.
    pub fn min_count(&self) -> Option<usize> {
        self.buckets.values().map(|b| b.count).min()
    }

    /// Total records accepted across all categories.
    pub fn total_accepted(&self) -> usize {
        self.buckets.values().map(|b| b.count).sum()
    }

    /// Acceptance count for one category, if observed.
    pub fn count_for(&self, category: &str) -> Option<usize> {
        self.buckets.get(category).map(|b| b.count)
    }

    pub fn quota(&self) -> usize {
        self.quota
    }

    /// Per-category buffers in discovery order. This is the read-only view
    /// the finalizer consumes.
    pub fn buckets(&self) -> impl Iterator<Item = (&str, &[Record])> {
        self.discovery_order.iter().map(|category| {
            let bucket = &self.buckets[category];
            (category.as_str(), bucket.records.as_slice())
        })
    }
}
