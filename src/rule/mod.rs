//! Rule records and the rule record grammar.
//!
//! A rule is one permit condition, written as
//! `direction,protocol,port_spec,ip_spec`:
//!
//! ```text
//! inbound,tcp,80,192.168.1.2
//! outbound,udp,1000-2000,52.12.48.92-52.12.48.100
//! ```

mod key;
mod port;
mod range;

pub use key::RuleKey;
pub use port::PortRange;
pub use range::IpRange;

pub(crate) use port::parse_port;

use std::fmt;
use std::str::FromStr;

use crate::error::RuleError;
use crate::{Direction, Error, Protocol, Result};

/// A single permit condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rule {
    pub key: RuleKey,
    pub ports: PortRange,
    pub ips: IpRange,
}

impl Rule {
    /// Create a new Rule.
    pub fn new(direction: Direction, protocol: Protocol, ports: PortRange, ips: IpRange) -> Self {
        Self {
            key: RuleKey::new(direction, protocol),
            ports,
            ips,
        }
    }

    /// Parse a rule record.
    ///
    /// Fails with [`Error::MalformedRule`] if the record does not have exactly
    /// four fields, a token is outside its vocabulary, a number or address does
    /// not parse, or a range is inverted.
    ///
    /// # Examples
    /// ```
    /// use fwrule::rule::Rule;
    ///
    /// let rule = Rule::parse("inbound,tcp,80,192.168.1.1-192.168.1.5").unwrap();
    /// assert_eq!(rule.ports.len(), 1);
    /// assert!(Rule::parse("inbound,tcp,80").is_err());
    /// ```
    pub fn parse(record: &str) -> Result<Self> {
        parse_fields(record).map_err(|e| e.into_error(record))
    }
}

fn parse_fields(record: &str) -> std::result::Result<Rule, RuleError> {
    let fields: Vec<&str> = record.split(',').collect();
    let &[direction, protocol, ports, ips] = fields.as_slice() else {
        return Err(RuleError::FieldCount(fields.len()));
    };

    let direction = Direction::parse(direction)
        .ok_or_else(|| RuleError::UnknownDirection(direction.to_string()))?;
    let protocol = Protocol::parse(protocol)
        .ok_or_else(|| RuleError::UnknownProtocol(protocol.to_string()))?;

    Ok(Rule::new(
        direction,
        protocol,
        PortRange::parse(ports)?,
        IpRange::parse(ips)?,
    ))
}

impl FromStr for Rule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Rule::parse(s)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.key, self.ports, self.ips)
    }
}
