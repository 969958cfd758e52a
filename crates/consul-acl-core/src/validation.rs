//! Validation of raw rule declarations.
//!
//! Validation never stops at the first problem: every declaration is
//! checked and all errors are returned together, alongside the rules that
//! passed, so a whole rule block can be fixed in one edit.

use crate::error::{ValidationError, ValidationErrors};
use crate::policy::Policy;
use crate::rule::{RawRule, RuleRecord, RuleSet};
use crate::scope::{Scope, ScopeClass};

/// Outcome of validating a rule block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validated {
    /// Normalized rules for declarations that passed every check.
    pub rules: RuleSet,
    /// Problems found, in declaration order.
    pub errors: Vec<ValidationError>,
}

impl Validated {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The rules if there were no errors, otherwise all errors.
    pub fn into_result(self) -> Result<RuleSet, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(self.rules)
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

/// Validate and normalize a block of raw declarations.
///
/// Normalization lower-cases scope, prefix and policy, and gives
/// prefixed-scope rules without a prefix the empty prefix.
pub fn validate(raw: &[RawRule]) -> Validated {
    let mut out = Validated::default();
    for (index, rule) in raw.iter().enumerate() {
        match validate_one(index, rule) {
            Ok(record) => out.rules.push(record),
            Err(errors) => out.errors.extend(errors),
        }
    }
    out
}

fn validate_one(index: usize, raw: &RawRule) -> Result<RuleRecord, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let scope_name = non_empty(&raw.scope);
    let policy_name = non_empty(&raw.policy);
    let prefix = non_empty(&raw.prefix);

    if scope_name.is_none() {
        errors.push(ValidationError::MissingField {
            index,
            field: "scope",
        });
    }
    if policy_name.is_none() {
        errors.push(ValidationError::MissingField {
            index,
            field: "policy",
        });
    }

    let scope = scope_name.and_then(|name| {
        let scope = Scope::parse(name);
        if scope.is_none() {
            errors.push(ValidationError::UnknownScope {
                index,
                scope: name.to_string(),
            });
        }
        scope
    });

    if let (Some(scope), Some(_)) = (scope, prefix) {
        if scope.class() == ScopeClass::Singleton {
            errors.push(ValidationError::IllegalPrefix {
                index,
                scope: scope.as_str().to_string(),
            });
        }
    }

    let policy = policy_name.map(Policy::parse);
    if let Some(Policy::Other(name)) = &policy {
        errors.push(ValidationError::UnknownPolicy {
            index,
            policy: name.clone(),
        });
    }

    match (scope, policy) {
        (Some(scope), Some(policy)) if errors.is_empty() => Ok(match scope.class() {
            ScopeClass::Prefixed => {
                RuleRecord::prefixed(scope.as_str(), prefix.unwrap_or("").to_lowercase(), policy)
            }
            ScopeClass::Singleton => RuleRecord::singleton(scope.as_str(), policy),
        }),
        _ => Err(errors),
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_rules_are_normalized() {
        let raw = vec![
            RawRule::new("KEY", "Read").with_prefix("Foo/Bar"),
            RawRule::new("service", "write"),
            RawRule::new("Operator", "DENY"),
        ];
        let validated = validate(&raw);
        assert!(validated.is_valid());
        assert_eq!(
            validated.rules.as_slice(),
            &[
                RuleRecord::prefixed("key", "foo/bar", Policy::Read),
                RuleRecord::prefixed("service", "", Policy::Write),
                RuleRecord::singleton("operator", Policy::Deny),
            ]
        );
    }

    #[test]
    fn test_errors_are_aggregated() {
        let raw = vec![
            RawRule {
                scope: Some("key".into()),
                prefix: Some("a".into()),
                policy: None,
            },
            RawRule {
                scope: Some("node".into()),
                prefix: None,
                policy: Some(String::new()),
            },
            RawRule::new("keyring", "write").with_prefix("x"),
        ];
        let validated = validate(&raw);
        assert_eq!(validated.errors.len(), 3);
        assert!(validated.rules.is_empty());
        assert_eq!(
            validated.errors[0],
            ValidationError::MissingField {
                index: 0,
                field: "policy"
            }
        );
        assert_eq!(
            validated.errors[2],
            ValidationError::IllegalPrefix {
                index: 2,
                scope: "keyring".into()
            }
        );
    }

    #[test]
    fn test_partial_success() {
        let raw = vec![
            RawRule::new("operator", "read").with_prefix("x"),
            RawRule::new("key", "write"),
        ];
        let validated = validate(&raw);
        assert_eq!(validated.errors.len(), 1);
        assert_eq!(validated.rules.len(), 1);
        assert!(validated.into_result().is_err());
    }

    #[test]
    fn test_illegal_prefix_on_singleton() {
        let validated = validate(&[RawRule::new("operator", "read").with_prefix("x")]);
        assert!(validated.rules.is_empty());
        assert!(matches!(
            validated.errors.as_slice(),
            [ValidationError::IllegalPrefix { index: 0, .. }]
        ));
    }

    #[test]
    fn test_empty_prefix_allowed_on_singleton() {
        let validated = validate(&[RawRule::new("keyring", "read").with_prefix("")]);
        assert!(validated.is_valid());
        assert_eq!(validated.rules.as_slice()[0].prefix, None);
    }

    #[test]
    fn test_missing_scope_and_policy() {
        let validated = validate(&[RawRule::default()]);
        assert_eq!(validated.errors.len(), 2);
    }

    #[test]
    fn test_unknown_scope_and_policy() {
        let validated = validate(&[RawRule::new("acl", "list")]);
        assert_eq!(
            validated.errors,
            vec![
                ValidationError::UnknownScope {
                    index: 0,
                    scope: "acl".into()
                },
                ValidationError::UnknownPolicy {
                    index: 0,
                    policy: "list".into()
                },
            ]
        );
    }

    #[test]
    fn test_into_result_ok() {
        let rules = validate(&[RawRule::new("key", "read")]).into_result().unwrap();
        assert_eq!(rules.len(), 1);
    }
}
