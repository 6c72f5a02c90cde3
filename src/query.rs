//! Query records and the pass/fail runner.
//!
//! A query is a packet descriptor plus the expected verdict, written as
//! `direction,protocol,port,ip_address,expected_bool`:
//!
//! ```text
//! inbound,tcp,80,192.168.1.2,true
//! inbound,udp,24,52.12.48.92,false
//! ```

use serde::Serialize;
use std::fmt;
use std::io::{BufReader, Read};

use crate::index::RuleIndex;
use crate::loader::numbered_lines;
use crate::rule::parse_port;
use crate::{Error, Result};

/// A packet descriptor with its expected verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub direction: String,
    pub protocol: String,
    pub port: u16,
    pub ip: String,
    pub expected: bool,
}

impl Query {
    /// Parse a query record.
    ///
    /// Direction and protocol are kept as raw tokens; unknown tokens deny at
    /// lookup time. The address is validated at lookup time too.
    pub fn parse(record: &str) -> Result<Self> {
        let malformed = |reason: String| Error::MalformedQuery {
            record: record.to_string(),
            reason,
        };

        let fields: Vec<&str> = record.split(',').collect();
        let &[direction, protocol, port, ip, expected] = fields.as_slice() else {
            return Err(malformed(format!("expected 5 fields, got {}", fields.len())));
        };

        let port = parse_port(port).map_err(|e| malformed(e.to_string()))?;
        let expected = parse_flag(expected)
            .ok_or_else(|| malformed(format!("invalid expected flag: {expected:?}")))?;

        Ok(Self {
            direction: direction.to_string(),
            protocol: protocol.to_string(),
            port,
            ip: ip.to_string(),
            expected,
        })
    }

    /// Evaluate this query against an index.
    pub fn evaluate(&self, index: &RuleIndex) -> Outcome {
        match index.accept_packet(&self.direction, &self.protocol, self.port, &self.ip) {
            Ok(true) => Outcome::Permit,
            Ok(false) => Outcome::Deny,
            Err(e) => Outcome::Error(e.to_string()),
        }
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// What the index answered for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Permit,
    Deny,
    /// Lookup failed, e.g. a malformed address
    Error(String),
}

impl Outcome {
    /// Check whether this outcome agrees with an expected verdict.
    /// An error never agrees.
    pub fn agrees_with(&self, expected: bool) -> bool {
        match self {
            Outcome::Permit => expected,
            Outcome::Deny => !expected,
            Outcome::Error(_) => false,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Permit => write!(f, "permit"),
            Outcome::Deny => write!(f, "deny"),
            Outcome::Error(e) => write!(f, "error: {}", e),
        }
    }
}

/// A query whose outcome disagreed with its expected verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// 1-based line number
    pub line: usize,
    pub record: String,
    pub expected: bool,
    pub outcome: Outcome,
}

/// Pass/fail counts for a batch of queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failures: Vec<Failure>,
}

impl Summary {
    /// Check if every query passed.
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Number of passed test cases: {}/{}", self.passed, self.total)
    }
}

/// Runs query records against an index.
pub struct QueryRunner<'a> {
    index: &'a RuleIndex,
}

impl<'a> QueryRunner<'a> {
    pub fn new(index: &'a RuleIndex) -> Self {
        Self { index }
    }

    /// Evaluate every query line from a reader.
    ///
    /// Blank lines are ignored. A malformed query record fails the run with
    /// [`Error::Line`].
    pub fn run<R: Read>(&self, reader: R) -> Result<Summary> {
        let mut summary = Summary::default();

        for line in numbered_lines(BufReader::new(reader)) {
            let (line_no, text) = line?;
            let line = text.map_err(|lossy| {
                Error::MalformedQuery {
                    record: lossy.trim().to_string(),
                    reason: "record is not valid UTF-8".to_string(),
                }
                .at_line(line_no)
            })?;
            let record = line.trim();
            if record.is_empty() {
                continue;
            }

            let query = Query::parse(record).map_err(|e| e.at_line(line_no))?;
            let outcome = query.evaluate(self.index);

            summary.total += 1;
            if outcome.agrees_with(query.expected) {
                summary.passed += 1;
            } else {
                log::debug!("Query on line {} failed: {} ({})", line_no, record, outcome);
                summary.failures.push(Failure {
                    line: line_no,
                    record: record.to_string(),
                    expected: query.expected,
                    outcome,
                });
            }
        }

        Ok(summary)
    }
}
