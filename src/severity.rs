use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered classification of an issue's importance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Severity {
    /// All severities, lowest first
    pub const ALL: [Severity; 4] = [
        Severity::None,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
    ];

    /// Upper-case name as accepted on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Severity::None => "NONE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }

    /// Comma-separated list of valid names, for usage and error messages
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a severity name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("severity must be one of {}", Severity::valid_names())]
pub struct ParseSeverityError;

impl FromStr for Severity {
    type Err = ParseSeverityError;

    // Exact upper-case names only, matching the CLI contract
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sev| sev.name() == s)
            .ok_or(ParseSeverityError)
    }
}
