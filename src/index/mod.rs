//! The rule index.
//!
//! Rules are folded into a two-level mapping, (direction, protocol) to port
//! to [`RangeSeq`], by a [`RuleIndexBuilder`]. Building freezes the mapping
//! into a [`RuleIndex`] which has no mutating methods and can be shared
//! between threads by reference or `Arc`.
//!
//! A rule spanning a port range gets one entry per port it covers, so a
//! lookup is two hash probes and one binary search.

mod ranges;

pub use ranges::RangeSeq;

use ahash::AHashMap;
use serde::Serialize;
use std::fmt;

use crate::ip::{self, IpKey};
use crate::rule::{IpRange, Rule, RuleKey};
use crate::{Direction, Protocol, Result};

type PortMap = AHashMap<u16, RangeSeq>;

/// Accumulates rules before freezing them into a [`RuleIndex`].
///
/// # Examples
/// ```
/// use fwrule::{Direction, Protocol, RuleIndexBuilder};
///
/// let mut builder = RuleIndexBuilder::new();
/// builder.ingest("inbound,tcp,80,192.168.1.1-192.168.1.5").unwrap();
/// let index = builder.build();
///
/// assert!(index.accept(Direction::Inbound, Protocol::Tcp, 80, "192.168.1.3").unwrap());
/// ```
#[derive(Debug, Default)]
pub struct RuleIndexBuilder {
    keys: AHashMap<RuleKey, PortMap>,
    rules: usize,
}

impl RuleIndexBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one rule record and fold it into the index.
    ///
    /// On error nothing is inserted.
    pub fn ingest(&mut self, record: &str) -> Result<()> {
        let rule = Rule::parse(record)?;
        self.insert(rule);
        Ok(())
    }

    /// Fold a parsed rule into the index.
    pub fn insert(&mut self, rule: Rule) {
        let ports = self.keys.entry(rule.key).or_default();
        for port in rule.ports.ports() {
            ports.entry(port).or_default().insert(rule.ips);
        }
        self.rules += 1;
    }

    /// Number of rules folded in so far.
    pub fn rule_count(&self) -> usize {
        self.rules
    }

    /// Freeze the builder into a read-only index.
    pub fn build(mut self) -> RuleIndex {
        for ports in self.keys.values_mut() {
            for seq in ports.values_mut() {
                seq.shrink_to_fit();
            }
            ports.shrink_to_fit();
        }
        self.keys.shrink_to_fit();

        let index = RuleIndex {
            keys: self.keys,
            rules: self.rules,
        };
        log::debug!("Built rule index: {}", index.stats());
        index
    }
}

impl Extend<Rule> for RuleIndexBuilder {
    fn extend<I: IntoIterator<Item = Rule>>(&mut self, rules: I) {
        for rule in rules {
            self.insert(rule);
        }
    }
}

/// Read-only index answering permit/deny for packet descriptors.
///
/// Anything not covered by a rule is denied, including every query against
/// an empty index.
#[derive(Debug, Default)]
pub struct RuleIndex {
    keys: AHashMap<RuleKey, PortMap>,
    rules: usize,
}

impl RuleIndex {
    /// An index with no rules. Denies everything.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an index from rule records.
    ///
    /// Fails fast: the first malformed record is returned as
    /// [`Error::MalformedRule`](crate::Error::MalformedRule) and no index is
    /// produced. Use [`RuleLoader`](crate::RuleLoader) with
    /// [`ErrorPolicy::Skip`](crate::ErrorPolicy::Skip) to keep going past bad
    /// records.
    pub fn build<I, S>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = RuleIndexBuilder::new();
        for record in records {
            builder.ingest(record.as_ref())?;
        }
        Ok(builder.build())
    }

    /// Build an index from already parsed rules.
    pub fn from_rules<I: IntoIterator<Item = Rule>>(rules: I) -> Self {
        let mut builder = RuleIndexBuilder::new();
        builder.extend(rules);
        builder.build()
    }

    /// Decide whether a packet is permitted.
    ///
    /// The address is validated before anything else, so a malformed address
    /// fails with [`Error::MalformedAddress`](crate::Error::MalformedAddress)
    /// even when no rule exists for the key or port.
    pub fn accept(
        &self,
        direction: Direction,
        protocol: Protocol,
        port: u16,
        ip_text: &str,
    ) -> Result<bool> {
        let target = ip::encode(ip_text)?;
        Ok(self.contains(RuleKey::new(direction, protocol), port, target))
    }

    /// Decide whether a packet is permitted, taking direction and protocol as
    /// raw tokens.
    ///
    /// Tokens outside the direction or protocol vocabulary can never have a
    /// rule, so they deny rather than fail. The address is still validated.
    pub fn accept_packet(
        &self,
        direction: &str,
        protocol: &str,
        port: u16,
        ip_text: &str,
    ) -> Result<bool> {
        let target = ip::encode(ip_text)?;
        Ok(RuleKey::parse(direction, protocol)
            .map(|key| self.contains(key, port, target))
            .unwrap_or(false))
    }

    /// Lookup with an already encoded address.
    pub fn contains(&self, key: RuleKey, port: u16, target: IpKey) -> bool {
        self.keys
            .get(&key)
            .and_then(|ports| ports.get(&port))
            .map(|seq| seq.contains(target))
            .unwrap_or(false)
    }

    /// Stored ranges for a (key, port) slot, in ascending `lo` order.
    pub fn ranges(&self, key: RuleKey, port: u16) -> Option<&[IpRange]> {
        self.keys
            .get(&key)
            .and_then(|ports| ports.get(&port))
            .map(RangeSeq::ranges)
    }

    /// Number of rules the index was built from.
    pub fn rule_count(&self) -> usize {
        self.rules
    }

    /// Check if the index holds no rules.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Collect size statistics.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            rules: self.rules,
            keys: self.keys.len(),
            ports: self.keys.values().map(|ports| ports.len()).sum(),
            ranges: self
                .keys
                .values()
                .flat_map(|ports| ports.values())
                .map(RangeSeq::len)
                .sum(),
        }
    }
}

impl FromIterator<Rule> for RuleIndex {
    fn from_iter<I: IntoIterator<Item = Rule>>(rules: I) -> Self {
        Self::from_rules(rules)
    }
}

/// Size statistics for a [`RuleIndex`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Rules ingested
    pub rules: usize,
    /// Distinct (direction, protocol) keys
    pub keys: usize,
    /// Distinct (key, port) slots
    pub ports: usize,
    /// Stored ranges across all slots
    pub ranges: usize,
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rules, {} keys, {} ports, {} ranges",
            self.rules, self.keys, self.ports, self.ranges
        )
    }
}
