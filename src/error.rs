//! Error types for fwrule.

use thiserror::Error;

/// Error type for fwrule operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A rule record violates the record grammar
    #[error("malformed rule {record:?}: {source}")]
    MalformedRule {
        record: String,
        #[source]
        source: RuleError,
    },

    /// An address is not a valid dotted quad
    #[error("malformed address: {0:?}")]
    MalformedAddress(String),

    /// A query record violates the query grammar
    #[error("malformed query {record:?}: {reason}")]
    MalformedQuery { record: String, reason: String },

    /// Failure on a specific line of an input stream (1-based)
    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<Error>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn at_line(self, line: usize) -> Self {
        Error::Line {
            line,
            source: Box::new(self),
        }
    }

    /// Returns true if this error (or the error it wraps) is a malformed rule.
    pub fn is_malformed_rule(&self) -> bool {
        match self {
            Error::MalformedRule { .. } => true,
            Error::Line { source, .. } => source.is_malformed_rule(),
            _ => false,
        }
    }

    /// Returns true if this error (or the error it wraps) is a malformed address.
    pub fn is_malformed_address(&self) -> bool {
        match self {
            Error::MalformedAddress(_) => true,
            Error::Line { source, .. } => source.is_malformed_address(),
            _ => false,
        }
    }
}

/// Result type alias for fwrule operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The reason a rule record was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// Record is not valid UTF-8
    #[error("record is not valid UTF-8")]
    InvalidEncoding,

    /// Record does not have exactly four comma separated fields
    #[error("expected 4 fields, got {0}")]
    FieldCount(usize),

    /// Direction is not `inbound` or `outbound`
    #[error("unknown direction: {0:?}")]
    UnknownDirection(String),

    /// Protocol is not a known transport protocol
    #[error("unknown protocol: {0:?}")]
    UnknownProtocol(String),

    /// Port is not an integer in [0, 65535]
    #[error("invalid port: {0:?}")]
    InvalidPort(String),

    /// Port range lower bound exceeds upper bound
    #[error("inverted port range: {lo}-{hi}")]
    InvertedPortRange { lo: u16, hi: u16 },

    /// Address is not a valid dotted quad
    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    /// Address range lower bound exceeds upper bound
    #[error("inverted address range: {lo}-{hi}")]
    InvertedAddressRange { lo: String, hi: String },
}

impl RuleError {
    pub(crate) fn into_error(self, record: &str) -> Error {
        Error::MalformedRule {
            record: record.to_string(),
            source: self,
        }
    }
}
