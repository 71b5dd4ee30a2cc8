//! Sort and deduplicate a series by timestamp.
//!
//! Equality for deduplication is timestamp equality only. Among records sharing
//! a timestamp the one that survives is whichever the sort placed first; the
//! sort is unstable, so that is not necessarily the first one collected.

/// A record ordered by a seconds-since-epoch timestamp.
pub trait Timestamped {
    fn timestamp(&self) -> u32;
}

/// Sort `series` by timestamp, ascending.
pub fn sort_by_timestamp<T: Timestamped>(series: &mut [T]) {
    series.sort_unstable_by_key(Timestamped::timestamp);
}

/// Collapse runs of equal timestamps in an already sorted `series`, keeping the
/// first record of each run and shifting kept records down over the gaps.
///
/// Returns the new logical length. Records at or beyond it are stale.
pub fn dedup_sorted<T: Timestamped>(series: &mut [T]) -> usize {
    if series.is_empty() {
        return 0;
    }
    let mut keep = 1;
    for i in 1..series.len() {
        if series[i].timestamp() != series[keep - 1].timestamp() {
            if keep != i {
                series.swap(keep, i);
            }
            keep += 1;
        }
    }
    keep
}

/// Sort then deduplicate `series`, returning the new logical length.
///
/// # Example
/// ```
/// use beacon::compact::{compact, Timestamped};
///
/// struct Sample(u32);
/// impl Timestamped for Sample {
///     fn timestamp(&self) -> u32 { self.0 }
/// }
///
/// let mut series: Vec<Sample> = [5, 3, 3, 1, 5].into_iter().map(Sample).collect();
/// let len = compact(&mut series);
/// let times: Vec<u32> = series[..len].iter().map(|s| s.0).collect();
/// assert_eq!(times, [1, 3, 5]);
/// ```
pub fn compact<T: Timestamped>(series: &mut [T]) -> usize {
    sort_by_timestamp(series);
    dedup_sorted(series)
}
