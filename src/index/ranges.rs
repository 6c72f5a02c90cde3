//! Ordered address range sequences.

use crate::ip::IpKey;
use crate::rule::IpRange;

/// Ranges for one (key, port) slot, sorted ascending by `lo`.
///
/// Ranges are never merged or deduplicated. Next to each range the sequence
/// keeps its reach: the largest `hi` among that range and every range before
/// it. A target is covered iff the reach of the last range with `lo <= target`
/// is at least the target, which keeps lookup exact when ranges overlap or
/// nest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSeq {
    ranges: Vec<IpRange>,
    reach: Vec<IpKey>,
}

impl RangeSeq {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a range, keeping the sequence sorted by `lo`.
    ///
    /// The range goes immediately before the first range whose `lo` is
    /// strictly greater, so ranges with equal `lo` keep insertion order.
    pub fn insert(&mut self, range: IpRange) {
        let pos = self.upper_bound(range.lo());
        let floor = match pos {
            0 => range.hi(),
            _ => self.reach[pos - 1].max(range.hi()),
        };

        self.ranges.insert(pos, range);
        self.reach.insert(pos, floor);
        for reach in &mut self.reach[pos + 1..] {
            *reach = (*reach).max(range.hi());
        }
    }

    /// Index of the first range whose `lo` is strictly greater than `target`.
    pub fn upper_bound(&self, target: IpKey) -> usize {
        self.ranges.partition_point(|r| r.lo() <= target)
    }

    /// Check whether any range contains `target`.
    pub fn contains(&self, target: IpKey) -> bool {
        match self.upper_bound(target) {
            // every range starts above the target
            0 => false,
            pos => self.reach[pos - 1] >= target,
        }
    }

    /// The stored ranges, in ascending `lo` order.
    pub fn ranges(&self) -> &[IpRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.ranges.shrink_to_fit();
        self.reach.shrink_to_fit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ip;

    fn range(spec: &str) -> IpRange {
        IpRange::parse(spec).unwrap()
    }

    fn key(text: &str) -> IpKey {
        ip::encode(text).unwrap()
    }

    #[test]
    fn test_empty_denies() {
        let seq = RangeSeq::new();
        assert!(seq.is_empty());
        assert_eq!(seq.upper_bound(0), 0);
        assert!(!seq.contains(0));
        assert!(!seq.contains(u32::MAX));
    }

    #[test]
    fn test_insert_keeps_sorted() {
        let mut seq = RangeSeq::new();
        seq.insert(range("10.0.0.50-10.0.0.60"));
        seq.insert(range("10.0.0.1-10.0.0.5"));
        seq.insert(range("10.0.0.200"));
        seq.insert(range("10.0.0.20-10.0.0.30"));

        let los: Vec<IpKey> = seq.ranges().iter().map(|r| r.lo()).collect();
        let mut sorted = los.clone();
        sorted.sort_unstable();
        assert_eq!(los, sorted);
        assert_eq!(seq.len(), 4);
    }

    #[test]
    fn test_equal_lo_keeps_insertion_order() {
        let mut seq = RangeSeq::new();
        let first = range("10.0.0.1-10.0.0.9");
        let second = range("10.0.0.1-10.0.0.3");
        let third = range("10.0.0.1");
        seq.insert(first);
        seq.insert(second);
        seq.insert(third);
        assert_eq!(seq.ranges(), &[first, second, third]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut seq = RangeSeq::new();
        seq.insert(range("1.1.1.1"));
        seq.insert(range("1.1.1.1"));
        assert_eq!(seq.len(), 2);
        assert!(seq.contains(key("1.1.1.1")));
    }

    #[test]
    fn test_upper_bound() {
        let mut seq = RangeSeq::new();
        seq.insert(range("10.0.0.10-10.0.0.20"));
        seq.insert(range("10.0.0.30-10.0.0.40"));

        assert_eq!(seq.upper_bound(key("10.0.0.9")), 0);
        assert_eq!(seq.upper_bound(key("10.0.0.10")), 1);
        assert_eq!(seq.upper_bound(key("10.0.0.29")), 1);
        assert_eq!(seq.upper_bound(key("10.0.0.30")), 2);
        assert_eq!(seq.upper_bound(key("255.0.0.0")), 2);
    }

    #[test]
    fn test_contains_disjoint_boundaries() {
        let mut seq = RangeSeq::new();
        seq.insert(range("10.0.0.10-10.0.0.20"));
        seq.insert(range("10.0.0.30-10.0.0.40"));

        assert!(!seq.contains(key("10.0.0.9")));
        assert!(seq.contains(key("10.0.0.10")));
        assert!(seq.contains(key("10.0.0.20")));
        assert!(!seq.contains(key("10.0.0.21")));
        assert!(!seq.contains(key("10.0.0.29")));
        assert!(seq.contains(key("10.0.0.30")));
        assert!(seq.contains(key("10.0.0.40")));
        assert!(!seq.contains(key("10.0.0.41")));
    }

    #[test]
    fn test_contains_nested_range() {
        // The immediate predecessor of .150 is the small range, which does
        // not cover it; the wide range before it does.
        let mut seq = RangeSeq::new();
        seq.insert(range("10.0.0.0-10.0.0.255"));
        seq.insert(range("10.0.0.100-10.0.0.110"));

        assert!(seq.contains(key("10.0.0.105")));
        assert!(seq.contains(key("10.0.0.150")));
        assert!(seq.contains(key("10.0.0.255")));
        assert!(!seq.contains(key("10.0.1.0")));
    }

    #[test]
    fn test_reach_updates_after_insert_before() {
        let mut seq = RangeSeq::new();
        seq.insert(range("10.0.0.100-10.0.0.110"));
        seq.insert(range("10.0.0.200"));
        assert!(!seq.contains(key("10.0.0.150")));

        seq.insert(range("10.0.0.0-10.0.0.255"));
        assert!(seq.contains(key("10.0.0.150")));
        assert!(seq.contains(key("10.0.0.201")));
    }

    #[test]
    fn test_contains_matches_linear_scan() {
        let specs = [
            "10.0.0.5-10.0.0.9",
            "10.0.0.0-10.0.0.3",
            "10.0.0.7-10.0.0.20",
            "10.0.0.12",
            "10.0.0.2-10.0.0.4",
            "10.0.0.30-10.0.0.31",
        ];
        let mut seq = RangeSeq::new();
        for spec in specs {
            seq.insert(range(spec));
        }

        let base = key("10.0.0.0");
        for offset in 0..40 {
            let target = base + offset;
            let expected = specs.iter().any(|s| range(s).contains(target));
            assert_eq!(seq.contains(target), expected, "offset {offset}");
        }
    }
}
