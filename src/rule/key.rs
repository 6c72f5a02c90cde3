//! First-level index key.

use std::fmt;

use crate::{Direction, Protocol};

/// Composite (direction, protocol) key identifying a rule family.
///
/// Kept as a typed pair so that two different token splits can never collide
/// on the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleKey {
    pub direction: Direction,
    pub protocol: Protocol,
}

impl RuleKey {
    /// Create a new RuleKey.
    pub fn new(direction: Direction, protocol: Protocol) -> Self {
        Self {
            direction,
            protocol,
        }
    }

    /// Parse a key from its direction and protocol tokens.
    ///
    /// Returns `None` if either token is outside its vocabulary.
    pub fn parse(direction: &str, protocol: &str) -> Option<Self> {
        Some(Self::new(
            Direction::parse(direction)?,
            Protocol::parse(protocol)?,
        ))
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.direction, self.protocol)
    }
}
