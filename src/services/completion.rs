//! Quota-completion detection.

use super::accumulator::CategoryAccumulator;

/// Decides, after each page, whether accumulation can stop early.
///
/// Completion holds iff the number of distinct categories observed has
/// reached `expected_categories` AND the minimum count across observed
/// categories has reached the quota. `expected_categories` is a configured
/// estimate; when it overshoots the true universe this check never fires,
/// and the fetch loop's independent exhaustion signal (an empty page) is the
/// real stopping guarantee. The two terminal conditions are deliberately
/// kept separate.
#[derive(Debug, Clone, Copy)]
pub struct CompletionDetector {
    expected_categories: usize,
    quota: usize,
}

impl CompletionDetector {
    pub fn new(expected_categories: usize, quota: usize) -> Self {
        Self {
            expected_categories,
            quota,
        }
    }

    /// O(#categories); intended to run once per page, not per record.
    pub fn is_complete(&self, state: &CategoryAccumulator) -> bool {
        state.categories_observed() >= self.expected_categories
            && state.min_count().is_some_and(|min| min >= self.quota)
    }
}
