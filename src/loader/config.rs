//! Loader configuration types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do when a rule line fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Fail the whole load on the first malformed line
    #[default]
    Abort,
    /// Log and collect malformed lines, build from the rest
    Skip,
}

impl ErrorPolicy {
    /// Get the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorPolicy::Abort => "abort",
            ErrorPolicy::Skip => "skip",
        }
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(ErrorPolicy::Abort),
            "skip" => Ok(ErrorPolicy::Skip),
            _ => Err(format!("unknown error policy: {s} (expected abort or skip)")),
        }
    }
}

/// Configuration for a [`RuleLoader`](super::RuleLoader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Behaviour on malformed rule lines
    pub error_policy: ErrorPolicy,
    /// Ignore lines starting with `#`
    pub allow_comments: bool,
}

impl LoaderConfig {
    /// Create a new LoaderConfig.
    pub fn new(error_policy: ErrorPolicy, allow_comments: bool) -> Self {
        Self {
            error_policy,
            allow_comments,
        }
    }

    /// Default configuration with the given error policy.
    pub fn with_policy(error_policy: ErrorPolicy) -> Self {
        Self {
            error_policy,
            ..Self::default()
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::Abort,
            allow_comments: true,
        }
    }
}
