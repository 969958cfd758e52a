//! Permission levels and their precedence.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Precedence table, most permissive first.
pub const PRECEDENCE: [&str; 3] = ["write", "read", "deny"];

/// The permission granted by a rule.
///
/// Documents read back from the token store may carry a level this crate
/// does not recognize; it is kept verbatim as [`Policy::Other`] so the
/// document can still be decoded and re-encoded.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Policy {
    Write,
    Read,
    Deny,
    Other(String),
}

impl Policy {
    /// Parse a policy level, ignoring ASCII case.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "write" => Policy::Write,
            "read" => Policy::Read,
            "deny" => Policy::Deny,
            other => Policy::Other(other.to_string()),
        }
    }

    /// Position in [`PRECEDENCE`]; lower is more permissive.
    ///
    /// Unrecognized levels have no rank. `None` orders below every
    /// `Some`, so an unranked policy compares as "more permissive" than
    /// any ranked one when used as a replacement candidate.
    pub fn rank(&self) -> Option<u8> {
        match self {
            Policy::Write => Some(0),
            Policy::Read => Some(1),
            Policy::Deny => Some(2),
            Policy::Other(_) => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        self.rank().is_some()
    }

    /// Lower-case textual form.
    pub fn as_str(&self) -> &str {
        match self {
            Policy::Write => "write",
            Policy::Read => "read",
            Policy::Deny => "deny",
            Policy::Other(s) => s,
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Policy {
    fn from(s: String) -> Self {
        Policy::parse(&s)
    }
}

impl From<&str> for Policy {
    fn from(s: &str) -> Self {
        Policy::parse(s)
    }
}

impl From<Policy> for String {
    fn from(p: Policy) -> Self {
        p.as_str().to_string()
    }
}
