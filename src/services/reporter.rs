//! Post-finalization balance verification.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::models::BalancedSample;

/// Distribution statistics over a finalized sample.
///
/// Computed from the sample itself, before upload; callers are expected to
/// double-check against the sink afterwards rather than trust this as
/// ground truth.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceReport {
    /// Total records in the sample.
    pub total: usize,
    /// `(category, count)` pairs, largest count first; ties broken by
    /// category name so the report is deterministic.
    pub counts: Vec<(String, usize)>,
    /// Smallest per-category count.
    pub min: usize,
    /// Largest per-category count.
    pub max: usize,
    /// Mean records per category.
    pub mean: f64,
}

impl BalanceReport {
    pub fn categories(&self) -> usize {
        self.counts.len()
    }

    /// The `n` largest categories.
    pub fn top(&self, n: usize) -> &[(String, usize)] {
        &self.counts[..n.min(self.counts.len())]
    }
}

/// Summarize a finalized sample. Pure function: no side effects, no
/// external calls.
pub fn summarize(sample: &BalancedSample) -> BalanceReport {
    let mut tallies: HashMap<&str, usize> = HashMap::new();
    for entry in &sample.records {
        *tallies.entry(entry.category.as_str()).or_insert(0) += 1;
    }

    let mut counts: Vec<(String, usize)> = tallies
        .into_iter()
        .map(|(category, count)| (category.to_string(), count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let min = counts.iter().map(|(_, n)| *n).min().unwrap_or(0);
    let max = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
    let mean = if counts.is_empty() {
        0.0
    } else {
        sample.records.len() as f64 / counts.len() as f64
    };

    BalanceReport {
        total: sample.records.len(),
        counts,
        min,
        max,
        mean,
    }
}
