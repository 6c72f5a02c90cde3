//! Inclusive port ranges.

use std::fmt;
use std::ops::RangeInclusive;

use crate::error::RuleError;

/// Inclusive range of ports `[lo, hi]`. A single port has `lo == hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRange {
    lo: u16,
    hi: u16,
}

impl PortRange {
    /// Create a range. Returns `None` if `lo > hi`.
    pub fn new(lo: u16, hi: u16) -> Option<Self> {
        (lo <= hi).then_some(Self { lo, hi })
    }

    /// Range covering a single port.
    pub fn single(port: u16) -> Self {
        Self { lo: port, hi: port }
    }

    /// Parse a port spec: `<int>` or `<int>-<int>`.
    pub fn parse(spec: &str) -> Result<Self, RuleError> {
        match spec.split_once('-') {
            Some((lo, hi)) => {
                let (lo, hi) = (parse_port(lo)?, parse_port(hi)?);
                Self::new(lo, hi).ok_or(RuleError::InvertedPortRange { lo, hi })
            }
            None => parse_port(spec).map(Self::single),
        }
    }

    pub fn lo(&self) -> u16 {
        self.lo
    }

    pub fn hi(&self) -> u16 {
        self.hi
    }

    /// Number of ports covered.
    pub fn len(&self) -> usize {
        usize::from(self.hi - self.lo) + 1
    }

    /// Always false: a range covers at least one port.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, port: u16) -> bool {
        self.lo <= port && port <= self.hi
    }

    /// Iterate every port in the range.
    pub fn ports(&self) -> RangeInclusive<u16> {
        self.lo..=self.hi
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lo == self.hi {
            write!(f, "{}", self.lo)
        } else {
            write!(f, "{}-{}", self.lo, self.hi)
        }
    }
}

/// Parse a decimal port number in `[0, 65535]`.
pub(crate) fn parse_port(s: &str) -> Result<u16, RuleError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RuleError::InvalidPort(s.to_string()));
    }
    s.parse().map_err(|_| RuleError::InvalidPort(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single() {
        let range = PortRange::parse("80").unwrap();
        assert_eq!(range, PortRange::single(80));
        assert_eq!(range.len(), 1);
        assert_eq!(range.to_string(), "80");
    }

    #[test]
    fn test_parse_range() {
        let range = PortRange::parse("10000-10010").unwrap();
        assert_eq!((range.lo(), range.hi()), (10000, 10010));
        assert_eq!(range.len(), 11);
        assert_eq!(range.ports().count(), 11);
        assert!(range.contains(10005));
        assert!(!range.contains(10011));
        assert_eq!(range.to_string(), "10000-10010");
    }

    #[test]
    fn test_full_range() {
        let range = PortRange::parse("0-65535").unwrap();
        assert_eq!(range.len(), 65536);
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(
            PortRange::parse("65536"),
            Err(RuleError::InvalidPort("65536".to_string()))
        );
        assert_eq!(
            PortRange::parse("http"),
            Err(RuleError::InvalidPort("http".to_string()))
        );
        assert_eq!(
            PortRange::parse("+80"),
            Err(RuleError::InvalidPort("+80".to_string()))
        );
        assert_eq!(
            PortRange::parse("80-"),
            Err(RuleError::InvalidPort(String::new()))
        );
        assert!(PortRange::parse("1-2-3").is_err());
    }

    #[test]
    fn test_parse_inverted() {
        assert_eq!(
            PortRange::parse("443-80"),
            Err(RuleError::InvertedPortRange { lo: 443, hi: 80 })
        );
    }
}
