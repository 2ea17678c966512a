//! Sample finalization: fair shares, then deterministic backfill.

use crate::domain::models::{BalancedSample, Record, SampleRecord};

/// Assemble the finalized sample from per-category buffers.
///
/// Phase 1 takes each category's fair share — `min(quota, buffer_len)`
/// records in buffer order — concatenated in category-discovery order.
/// Phase 2 backfills any remaining deficit by walking the categories again
/// in the same order and pulling records from beyond each buffer's first
/// `quota` entries, until the deficit is gone or every buffer is drained.
///
/// The result holds `min(target_total, total buffered records)` entries and
/// is fully deterministic for a fixed accumulation history: no randomness,
/// no shuffling. Surplus records are taken in arrival order, which favors
/// reproducibility over sampling uniformity among the surplus. The category
/// iteration order of the backfill is a policy decision, not an accident;
/// changing it changes which records a deficit pulls in.
///
/// The buffers are borrowed read-only; finalization never mutates
/// accumulator state.
pub fn finalize<'a, I>(buckets: I, quota: usize, target_total: usize) -> BalancedSample
where
    I: IntoIterator<Item = (&'a str, &'a [Record])>,
{
    let buckets: Vec<(&str, &[Record])> = buckets.into_iter().collect();
    let mut records = Vec::with_capacity(target_total);

    // Phase 1: fair share per category.
    for (category, buffer) in &buckets {
        let share = quota.min(buffer.len());
        records.extend(buffer[..share].iter().map(|record| SampleRecord {
            category: (*category).to_string(),
            record: record.clone(),
        }));
    }

    // Phase 2: backfill the deficit from over-quota buffers.
    let mut deficit = target_total.saturating_sub(records.len());
    for (category, buffer) in &buckets {
        if deficit == 0 {
            break;
        }
        if buffer.len() > quota {
            let surplus = &buffer[quota..];
            let take = deficit.min(surplus.len());
            records.extend(surplus[..take].iter().map(|record| SampleRecord {
                category: (*category).to_string(),
                record: record.clone(),
            }));
            deficit -= take;
        }
    }

    BalancedSample {
        records,
        target_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(seq: usize) -> Record {
        let mut r = Record::new();
        r.insert("seq", json!(seq));
        r
    }

    fn buffer(n: usize) -> Vec<Record> {
        (0..n).map(record).collect()
    }

    fn counts(sample: &BalancedSample, category: &str) -> usize {
        sample
            .records
            .iter()
            .filter(|s| s.category == category)
            .count()
    }

    #[test]
    fn test_fair_shares_in_discovery_order() {
        let a = buffer(3);
        let b = buffer(2);
        let buckets = vec![("B", a.as_slice()), ("A", b.as_slice())];
        let sample = finalize(buckets, 5, 10);

        assert_eq!(sample.len(), 5);
        // Discovery order, not alphabetical order.
        assert_eq!(sample.records[0].category, "B");
        assert_eq!(sample.records[3].category, "A");
    }

    #[test]
    fn test_backfill_pulls_surplus_beyond_quota() {
        // Target 10, quota 5, buffers A=8 and B=2. The fair shares give 7;
        // the deficit of 3 comes out of A's surplus.
        let a = buffer(8);
        let b = buffer(2);
        let sample = finalize(vec![("A", a.as_slice()), ("B", b.as_slice())], 5, 10);

        assert_eq!(sample.len(), 10);
        assert_eq!(counts(&sample, "A"), 8);
        assert_eq!(counts(&sample, "B"), 2);
        // The surplus entries are the ones beyond the first `quota`.
        let a_seqs: Vec<u64> = sample
            .records
            .iter()
            .filter(|s| s.category == "A")
            .map(|s| s.record.fields()["seq"].as_u64().unwrap())
            .collect();
        assert_eq!(a_seqs, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_backfill_stops_once_deficit_filled() {
        let a = buffer(10);
        let b = buffer(10);
        let sample = finalize(vec![("A", a.as_slice()), ("B", b.as_slice())], 4, 10);

        // Fair shares: 8. Deficit of 2 comes entirely from A, the first
        // category in discovery order; B's surplus is never touched.
        assert_eq!(sample.len(), 10);
        assert_eq!(counts(&sample, "A"), 6);
        assert_eq!(counts(&sample, "B"), 4);
    }

    #[test]
    fn test_shortfall_when_buffers_cannot_cover_target() {
        // Undersized source: 90 records total against a target of 100.
        let a = buffer(50);
        let b = buffer(40);
        let sample = finalize(vec![("A", a.as_slice()), ("B", b.as_slice())], 50, 100);

        assert_eq!(sample.len(), 90);
        assert_eq!(sample.shortfall(), 10);
        assert_eq!(counts(&sample, "A"), 50);
        assert_eq!(counts(&sample, "B"), 40);
    }

    #[test]
    fn test_exact_size_when_enough_records_buffered() {
        // 25 records buffered against a target of 12: the result is exact.
        let a = buffer(9);
        let b = buffer(9);
        let c = buffer(7);
        let sample = finalize(
            vec![("A", a.as_slice()), ("B", b.as_slice()), ("C", c.as_slice())],
            4,
            12,
        );
        assert_eq!(sample.len(), 12);
    }

    #[test]
    fn test_empty_state_yields_empty_sample() {
        let sample = finalize(Vec::<(&str, &[Record])>::new(), 5, 10);
        assert!(sample.is_empty());
        assert_eq!(sample.shortfall(), 10);
    }

    #[test]
    fn test_quota_zero_takes_only_backfill() {
        let a = buffer(4);
        let sample = finalize(vec![("A", a.as_slice())], 0, 3);
        // Phase 1 contributes nothing; the whole target is backfilled.
        assert_eq!(sample.len(), 3);
    }

    #[test]
    fn test_deterministic_for_fixed_history() {
        let a = buffer(7);
        let b = buffer(3);
        let buckets = || vec![("A", a.as_slice()), ("B", b.as_slice())];
        let one = finalize(buckets(), 4, 9);
        let two = finalize(buckets(), 4, 9);
        assert_eq!(
            serde_json::to_string(&one.records).unwrap(),
            serde_json::to_string(&two.records).unwrap()
        );
    }
}
