//! Rule records and rule sets.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::policy::Policy;

/// One access rule: a policy granted on a scope, optionally under a prefix.
///
/// `prefix` is `Some` exactly when the rule is rendered in block form
/// (`scope "prefix" { policy = "..." }`). Validated rules for prefixed
/// scopes always carry `Some`, possibly the empty string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleRecord {
    pub scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub policy: Policy,
}

impl RuleRecord {
    /// A rule addressed by `(scope, prefix)`.
    pub fn prefixed(scope: impl Into<String>, prefix: impl Into<String>, policy: Policy) -> Self {
        Self {
            scope: scope.into(),
            prefix: Some(prefix.into()),
            policy,
        }
    }

    /// A rule addressed by scope alone.
    pub fn singleton(scope: impl Into<String>, policy: Policy) -> Self {
        Self {
            scope: scope.into(),
            prefix: None,
            policy,
        }
    }

    /// The rule as the canonical encoding would write it: scope, prefix
    /// and policy lower-cased.
    pub fn normalized(&self) -> Self {
        Self {
            scope: self.scope.to_ascii_lowercase(),
            prefix: self.prefix.as_ref().map(|p| p.to_lowercase()),
            policy: Policy::parse(self.policy.as_str()),
        }
    }

    /// The `(scope, prefix)` key, scope lower-cased.
    pub fn key(&self) -> RuleKey {
        RuleKey {
            scope: self.scope.to_ascii_lowercase(),
            prefix: self.prefix.clone(),
        }
    }
}

impl fmt::Display for RuleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::canonical::encode_rule(self))
    }
}

/// Identity of a rule within a document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleKey {
    pub scope: String,
    pub prefix: Option<String>,
}

/// An ordered collection of rules compared as a set.
///
/// Order is whatever produced the set: declaration order after validation,
/// document order after decoding, scan order after a merge. Use
/// [`canonicalize`](crate::canonical::canonicalize) for the canonical order
/// and [`RuleSet::same_rules`] for order-insensitive comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<RuleRecord>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RuleRecord> {
        self.rules.iter()
    }

    pub fn as_slice(&self) -> &[RuleRecord] {
        &self.rules
    }

    pub fn into_vec(self) -> Vec<RuleRecord> {
        self.rules
    }

    /// First rule with the given key, scope compared case-insensitively.
    pub fn get(&self, scope: &str, prefix: Option<&str>) -> Option<&RuleRecord> {
        self.rules
            .iter()
            .find(|r| r.scope.eq_ignore_ascii_case(scope) && r.prefix.as_deref() == prefix)
    }

    /// Rules as an unordered set.
    pub fn to_set(&self) -> BTreeSet<RuleRecord> {
        self.rules.iter().cloned().collect()
    }

    /// Whether both sets hold the same rules, ignoring order.
    pub fn same_rules(&self, other: &RuleSet) -> bool {
        self.to_set() == other.to_set()
    }

    /// Whether no two rules share a `(scope, prefix)` key.
    pub fn has_unique_keys(&self) -> bool {
        let mut seen = BTreeSet::new();
        self.rules.iter().all(|r| seen.insert(r.key()))
    }

    pub(crate) fn push(&mut self, rule: RuleRecord) {
        self.rules.push(rule);
    }

    pub(crate) fn replace(&mut self, index: usize, rule: RuleRecord) {
        self.rules[index] = rule;
    }
}

impl From<Vec<RuleRecord>> for RuleSet {
    fn from(rules: Vec<RuleRecord>) -> Self {
        Self { rules }
    }
}

impl FromIterator<RuleRecord> for RuleSet {
    fn from_iter<I: IntoIterator<Item = RuleRecord>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RuleSet {
    type Item = RuleRecord;
    type IntoIter = std::vec::IntoIter<RuleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a RuleRecord;
    type IntoIter = std::slice::Iter<'a, RuleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// A rule declaration as supplied by the caller, before validation.
///
/// Every field is optional so that incomplete declarations reach the
/// validator and are reported rather than rejected during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRule {
    pub scope: Option<String>,
    pub prefix: Option<String>,
    pub policy: Option<String>,
}

impl RawRule {
    pub fn new(scope: &str, policy: &str) -> Self {
        Self {
            scope: Some(scope.to_string()),
            prefix: None,
            policy: Some(policy.to_string()),
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }
}

impl From<&RuleRecord> for RawRule {
    fn from(rule: &RuleRecord) -> Self {
        Self {
            scope: Some(rule.scope.clone()),
            prefix: rule.prefix.clone(),
            policy: Some(rule.policy.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_folds_case() {
        let rule = RuleRecord::prefixed("KEY", "Web/", Policy::Other("WRITE".into()));
        assert_eq!(
            rule.normalized(),
            RuleRecord::prefixed("key", "web/", Policy::Write)
        );
        let singleton = RuleRecord::singleton("Operator", Policy::Read);
        assert_eq!(singleton.normalized().prefix, None);
    }

    #[test]
    fn test_same_rules_ignores_order() {
        let a = RuleSet::from(vec![
            RuleRecord::singleton("operator", Policy::Read),
            RuleRecord::prefixed("key", "foo", Policy::Write),
        ]);
        let b = RuleSet::from(vec![
            RuleRecord::prefixed("key", "foo", Policy::Write),
            RuleRecord::singleton("operator", Policy::Read),
        ]);
        assert_ne!(a, b);
        assert!(a.same_rules(&b));
    }

    #[test]
    fn test_unique_keys() {
        let dup = RuleSet::from(vec![
            RuleRecord::prefixed("key", "foo", Policy::Read),
            RuleRecord::prefixed("KEY", "foo", Policy::Write),
        ]);
        assert!(!dup.has_unique_keys());

        let ok = RuleSet::from(vec![
            RuleRecord::prefixed("key", "foo", Policy::Read),
            RuleRecord::prefixed("key", "", Policy::Write),
        ]);
        assert!(ok.has_unique_keys());
    }

    #[test]
    fn test_get_by_key() {
        let set = RuleSet::from(vec![
            RuleRecord::prefixed("key", "foo", Policy::Read),
            RuleRecord::singleton("keyring", Policy::Write),
        ]);
        assert_eq!(set.get("KEY", Some("foo")).map(|r| &r.policy), Some(&Policy::Read));
        assert!(set.get("key", None).is_none());
        assert!(set.get("keyring", None).is_some());
    }

    #[test]
    fn test_raw_rule_from_json() {
        let raw: RawRule = serde_json::from_str(r#"{"scope":"key","policy":"read"}"#).unwrap();
        assert_eq!(raw.scope.as_deref(), Some("key"));
        assert_eq!(raw.prefix, None);

        let empty: RawRule = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, RawRule::default());
    }
}
