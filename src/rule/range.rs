//! Inclusive IPv4 address ranges.

use std::fmt;

use crate::error::RuleError;
use crate::ip::{self, IpKey};

/// Closed interval `[lo, hi]` of encoded addresses. A single address has
/// `lo == hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpRange {
    lo: IpKey,
    hi: IpKey,
}

impl IpRange {
    /// Create a range. Returns `None` if `lo > hi`.
    pub fn new(lo: IpKey, hi: IpKey) -> Option<Self> {
        (lo <= hi).then_some(Self { lo, hi })
    }

    /// Range covering a single address.
    pub fn single(key: IpKey) -> Self {
        Self { lo: key, hi: key }
    }

    /// Parse an address spec: `<dotted-quad>` or `<dotted-quad>-<dotted-quad>`.
    pub fn parse(spec: &str) -> Result<Self, RuleError> {
        match spec.split_once('-') {
            Some((lo_text, hi_text)) => {
                let (lo, hi) = (parse_addr(lo_text)?, parse_addr(hi_text)?);
                Self::new(lo, hi).ok_or_else(|| RuleError::InvertedAddressRange {
                    lo: lo_text.to_string(),
                    hi: hi_text.to_string(),
                })
            }
            None => parse_addr(spec).map(Self::single),
        }
    }

    pub fn lo(&self) -> IpKey {
        self.lo
    }

    pub fn hi(&self) -> IpKey {
        self.hi
    }

    pub fn contains(&self, key: IpKey) -> bool {
        self.lo <= key && key <= self.hi
    }
}

impl fmt::Display for IpRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lo == self.hi {
            write!(f, "{}", ip::decode(self.lo))
        } else {
            write!(f, "{}-{}", ip::decode(self.lo), ip::decode(self.hi))
        }
    }
}

fn parse_addr(text: &str) -> Result<IpKey, RuleError> {
    ip::encode(text).map_err(|_| RuleError::InvalidAddress(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single() {
        let range = IpRange::parse("192.168.0.0").unwrap();
        assert_eq!(range.lo(), range.hi());
        assert_eq!(range.to_string(), "192.168.0.0");
    }

    #[test]
    fn test_parse_range() {
        let range = IpRange::parse("192.168.1.1-192.168.1.5").unwrap();
        assert!(range.contains(ip::encode("192.168.1.1").unwrap()));
        assert!(range.contains(ip::encode("192.168.1.3").unwrap()));
        assert!(range.contains(ip::encode("192.168.1.5").unwrap()));
        assert!(!range.contains(ip::encode("192.168.1.6").unwrap()));
        assert!(!range.contains(ip::encode("192.168.1.0").unwrap()));
        assert_eq!(range.to_string(), "192.168.1.1-192.168.1.5");
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(
            IpRange::parse("192.168.1"),
            Err(RuleError::InvalidAddress("192.168.1".to_string()))
        );
        assert_eq!(
            IpRange::parse("1.1.1.1-"),
            Err(RuleError::InvalidAddress(String::new()))
        );
    }

    #[test]
    fn test_parse_inverted() {
        assert_eq!(
            IpRange::parse("10.0.0.9-10.0.0.1"),
            Err(RuleError::InvertedAddressRange {
                lo: "10.0.0.9".to_string(),
                hi: "10.0.0.1".to_string(),
            })
        );
    }
}
