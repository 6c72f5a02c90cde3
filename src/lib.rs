//! fwrule - a static packet-filtering rule engine.
//!
//! This crate answers whether a packet descriptor (direction, protocol, port,
//! IPv4 address) is permitted by a set of firewall rules. Each rule permits a
//! direction/protocol pair over a port range and an address range; anything
//! no rule covers is denied.
//!
//! # Features
//!
//! - **Interval index**: (direction, protocol) → port → address ranges sorted
//!   by lower bound, queried with an upper-bound binary search
//! - **Order-preserving address keys**: dotted quads encode to base-256 integers
//! - **Freeze after build**: a built [`RuleIndex`] is read-only and `Sync`
//! - **Hot reload**: [`SharedRuleIndex`] swaps in a freshly built index atomically
//! - **Loader**: line-oriented rule files, optionally gzip-compressed, with an
//!   abort or skip policy for malformed lines
//!
//! # Quick Start
//!
//! ```
//! use fwrule::{Direction, Protocol, RuleIndex};
//!
//! let index = RuleIndex::build([
//!     "inbound,tcp,80,192.168.1.1-192.168.1.5",
//!     "inbound,udp,10000-10010,192.168.0.0",
//! ])?;
//!
//! assert!(index.accept(Direction::Inbound, Protocol::Tcp, 80, "192.168.1.3")?);
//! assert!(!index.accept(Direction::Inbound, Protocol::Tcp, 80, "192.168.1.6")?);
//! assert!(!index.accept(Direction::Outbound, Protocol::Tcp, 80, "192.168.1.3")?);
//! assert!(index.accept(Direction::Inbound, Protocol::Udp, 10005, "192.168.0.0")?);
//!
//! // Malformed addresses are errors, not denials
//! assert!(index.accept(Direction::Inbound, Protocol::Tcp, 80, "999.1.1.1").is_err());
//! # Ok::<(), fwrule::Error>(())
//! ```
//!
//! # Rule Grammar
//!
//! One rule per line: `direction,protocol,port_spec,ip_spec`
//!
//! - **direction**: `inbound` or `outbound`
//! - **protocol**: `tcp` or `udp`
//! - **port_spec**: `80` or `1000-2000` (inclusive)
//! - **ip_spec**: `10.0.0.1` or `10.0.0.1-10.0.0.9` (inclusive)

mod direction;
mod error;
mod global;
mod protocol;
mod shared;

pub mod index;
pub mod ip;
pub mod loader;
pub mod query;
pub mod rule;

// Re-export core types
pub use direction::Direction;
pub use error::{Error, Result, RuleError};
pub use protocol::Protocol;

pub use index::{IndexStats, RuleIndex, RuleIndexBuilder};
pub use loader::{ErrorPolicy, LoadReport, LoaderConfig, RuleLoader};
pub use query::{Outcome, QueryRunner, Summary};
pub use rule::{IpRange, PortRange, Rule, RuleKey};
pub use shared::SharedRuleIndex;

// Re-export global API functions
pub use global::{
    accept_packet, current_index, generation, is_initialized, reload_rules,
    reload_rules_from_file, reload_rules_from_reader,
};
