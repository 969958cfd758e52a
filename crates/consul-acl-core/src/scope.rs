//! Scope registry: which ACL resource categories take a path prefix.
//!
//! The tables are fixed for the life of the process. Lookups are
//! case-insensitive; unknown names are neither prefixed nor singleton and
//! are left for the validator to reject.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Scopes whose rules apply to a path prefix.
pub const PREFIXED_SCOPES: &[&str] = &["agent", "event", "key", "node", "query", "service", "session"];

/// Scopes with a single rule for the whole category.
pub const SINGLETON_SCOPES: &[&str] = &["keyring", "operator"];

/// Whether rules for `scope` carry a prefix.
pub fn is_prefixed(scope: &str) -> bool {
    Scope::parse(scope).is_some_and(|s| s.class() == ScopeClass::Prefixed)
}

/// Whether `scope` is a singleton category.
pub fn is_singleton(scope: &str) -> bool {
    Scope::parse(scope).is_some_and(|s| s.class() == ScopeClass::Singleton)
}

/// Every scope name the registry knows about.
pub fn all_scopes() -> BTreeSet<&'static str> {
    PREFIXED_SCOPES
        .iter()
        .chain(SINGLETON_SCOPES.iter())
        .copied()
        .collect()
}

/// The two scope categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeClass {
    /// Rule is addressed by `(scope, prefix)`.
    Prefixed,
    /// Rule is addressed by scope alone.
    Singleton,
}

/// A known ACL scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Agent,
    Event,
    Key,
    Node,
    Query,
    Service,
    Session,
    Keyring,
    Operator,
}

impl Scope {
    /// All scopes, prefixed first, in registry order.
    pub const ALL: [Scope; 9] = [
        Scope::Agent,
        Scope::Event,
        Scope::Key,
        Scope::Node,
        Scope::Query,
        Scope::Service,
        Scope::Session,
        Scope::Keyring,
        Scope::Operator,
    ];

    /// Look up a scope by name, ignoring ASCII case.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.as_str().eq_ignore_ascii_case(name))
    }

    /// Canonical lower-case name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Scope::Agent => "agent",
            Scope::Event => "event",
            Scope::Key => "key",
            Scope::Node => "node",
            Scope::Query => "query",
            Scope::Service => "service",
            Scope::Session => "session",
            Scope::Keyring => "keyring",
            Scope::Operator => "operator",
        }
    }

    pub const fn class(&self) -> ScopeClass {
        match self {
            Scope::Keyring | Scope::Operator => ScopeClass::Singleton,
            _ => ScopeClass::Prefixed,
        }
    }

    pub const fn is_prefixed(&self) -> bool {
        matches!(self.class(), ScopeClass::Prefixed)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_match_enum() {
        for scope in Scope::ALL {
            match scope.class() {
                ScopeClass::Prefixed => assert!(PREFIXED_SCOPES.contains(&scope.as_str())),
                ScopeClass::Singleton => assert!(SINGLETON_SCOPES.contains(&scope.as_str())),
            }
        }
        assert_eq!(all_scopes().len(), Scope::ALL.len());
    }

    #[test]
    fn test_classification() {
        assert!(is_prefixed("key"));
        assert!(is_prefixed("Service"));
        assert!(!is_prefixed("operator"));
        assert!(is_singleton("OPERATOR"));
        assert!(is_singleton("keyring"));
        assert!(!is_singleton("session"));
    }

    #[test]
    fn test_unknown_scope() {
        assert!(!is_prefixed("acl"));
        assert!(!is_singleton("acl"));
        assert_eq!(Scope::parse("acl"), None);
        assert!(!all_scopes().contains("acl"));
    }
}
