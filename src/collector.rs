use tracing::trace;

use crate::compact::{compact, Timestamped};
use crate::{Error, Result};

/// Records added per growth when using [Growth::Fixed] with the default increment.
pub const DEFAULT_INCREMENT: usize = 128;

/// How a [Collector] grows its storage when full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    /// Add a fixed number of records each time. Allocation counts are predictable.
    Fixed(usize),
    /// Double the capacity, starting from [DEFAULT_INCREMENT].
    Doubling,
}

impl Default for Growth {
    fn default() -> Self {
        Growth::Fixed(DEFAULT_INCREMENT)
    }
}

/// Append-only storage for one series of records.
///
/// Growth reserves exactly the policy's amount and is fallible: running out of
/// memory is reported as [Error::Allocation] rather than aborting. Records are
/// only addressed by index, which stays valid across growth.
#[derive(Debug, Clone)]
pub struct Collector<T> {
    records: Vec<T>,
    growth: Growth,
    growths: usize,
}

impl<T> Default for Collector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Collector<T> {
    pub fn new() -> Self {
        Self::with_growth(Growth::default())
    }

    pub fn with_growth(growth: Growth) -> Self {
        Collector {
            records: Vec::new(),
            growth,
            growths: 0,
        }
    }

    fn increment(&self) -> usize {
        match self.growth {
            Growth::Fixed(n) => n.max(1),
            Growth::Doubling => self.records.capacity().max(DEFAULT_INCREMENT),
        }
    }

    /// Append a record, growing storage first if it is full.
    ///
    /// # Errors
    /// [Error::Allocation] if storage cannot be grown. The collector is left
    /// unchanged.
    pub fn push(&mut self, record: T) -> Result<()> {
        if self.records.len() == self.records.capacity() {
            let requested = self.increment();
            let old = self.records.capacity();
            self.records
                .try_reserve_exact(requested)
                .map_err(|source| Error::Allocation { requested, source })?;
            self.growths += 1;
            trace!(old, new = self.records.capacity(), "grew collector");
        }
        self.records.push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.records.capacity()
    }

    /// Number of times storage has been grown.
    pub fn growths(&self) -> usize {
        self.growths
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.records.get(index)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    /// Drop every record and release the storage.
    pub fn clear(&mut self) {
        self.records = Vec::new();
        self.growths = 0;
    }

    pub fn into_vec(self) -> Vec<T> {
        self.records
    }
}

impl<T: Timestamped> Collector<T> {
    /// Sort by timestamp and drop records with repeated timestamps, see
    /// [compact](crate::compact::compact). Returns the new length; the stale
    /// tail is discarded.
    pub fn compact(&mut self) -> usize {
        let len = compact(&mut self.records);
        self.records.truncate(len);
        len
    }
}

impl<'a, T> IntoIterator for &'a Collector<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_growth_counts_events() {
        let mut collector = Collector::new();
        for i in 0..129u32 {
            collector.push(i).unwrap();
        }
        assert_eq!(collector.len(), 129);
        assert_eq!(collector.growths(), 2, "0->128 and 128->256");
        assert_eq!(collector.capacity(), 256);
    }

    #[test]
    fn exactly_full_does_not_grow() {
        let mut collector = Collector::new();
        for i in 0..128u32 {
            collector.push(i).unwrap();
        }
        assert_eq!(collector.growths(), 1);
        assert_eq!(collector.capacity(), 128);
    }

    #[test]
    fn doubling_growth() {
        let mut collector = Collector::with_growth(Growth::Doubling);
        for i in 0..1000u32 {
            collector.push(i).unwrap();
        }
        // 128, 256, 512, 1024
        assert_eq!(collector.growths(), 4);
        assert_eq!(collector.capacity(), 1024);
    }

    #[test]
    fn indices_survive_growth() {
        let mut collector = Collector::with_growth(Growth::Fixed(2));
        for i in 0..10u32 {
            collector.push(i * 10).unwrap();
        }
        assert_eq!(collector.get(3), Some(&30));
        assert_eq!(collector.get(9), Some(&90));
        assert_eq!(collector.get(10), None);
        assert_eq!(collector.growths(), 5);
    }

    #[test]
    fn clear_releases_storage() {
        let mut collector = Collector::new();
        collector.push(1u32).unwrap();
        collector.clear();
        assert!(collector.is_empty());
        assert_eq!(collector.capacity(), 0);
        assert_eq!(collector.growths(), 0);
    }

    #[test]
    fn compact_truncates_stale_tail() {
        struct T(u32);
        impl Timestamped for T {
            fn timestamp(&self) -> u32 {
                self.0
            }
        }

        let mut collector = Collector::new();
        for ts in [5, 3, 3, 1, 5] {
            collector.push(T(ts)).unwrap();
        }
        assert_eq!(collector.compact(), 3);
        let times: Vec<u32> = collector.iter().map(|t| t.0).collect();
        assert_eq!(times, [1, 3, 5]);
    }
}
