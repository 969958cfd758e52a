//! Proptest generators for property-based testing.

use std::collections::BTreeMap;

use proptest::prelude::*;

use consul_acl_core::{Policy, RawRule, RuleRecord, RuleSet, Scope};

/// Generate a known scope.
pub fn scope() -> impl Strategy<Value = Scope> {
    prop::sample::select(Scope::ALL.to_vec())
}

/// Generate a lower-case prefix, occasionally with quotes, backslashes or
/// control characters that need escaping in a document.
pub fn prefix() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z0-9/_.-]{0,16}",
        1 => r#"[a-z"\\/]{1,8}"#,
        1 => "[a-z\n\r\t ]{1,8}",
    ]
    .prop_map(String::from)
}

/// Generate a recognized policy.
pub fn policy() -> impl Strategy<Value = Policy> {
    prop_oneof![Just(Policy::Write), Just(Policy::Read), Just(Policy::Deny)]
}

/// Generate an unrecognized policy as the decoder would keep it.
pub fn unknown_policy() -> impl Strategy<Value = Policy> {
    "[a-z\"\\\\\n\t ]{1,8}"
        .prop_filter("recognized policy", |s| Policy::parse(s).rank().is_none())
        .prop_map(Policy::Other)
}

/// Generate a rule in normalized form.
pub fn rule_record() -> impl Strategy<Value = RuleRecord> {
    (scope(), prefix(), policy()).prop_map(|(scope, prefix, policy)| {
        if scope.is_prefixed() {
            RuleRecord::prefixed(scope.as_str(), prefix, policy)
        } else {
            RuleRecord::singleton(scope.as_str(), policy)
        }
    })
}

/// Generate a rule set with at most one rule per `(scope, prefix)` key.
pub fn rule_set(max_len: usize) -> impl Strategy<Value = RuleSet> {
    prop::collection::vec(rule_record(), 0..=max_len).prop_map(|rules| {
        let by_key: BTreeMap<_, _> = rules.into_iter().map(|r| (r.key(), r)).collect();
        by_key.into_values().collect()
    })
}

/// Randomize the ASCII case of a string.
fn mixed_case(s: &str) -> impl Strategy<Value = String> {
    let chars: Vec<char> = s.chars().collect();
    prop::collection::vec(any::<bool>(), chars.len()).prop_map(move |upper| {
        chars
            .iter()
            .zip(upper)
            .map(|(c, up)| if up { c.to_ascii_uppercase() } else { *c })
            .collect()
    })
}

/// Declarations that pass validation, written with arbitrary case.
#[derive(Debug, Clone)]
pub struct ValidDeclarations(pub Vec<RawRule>);

impl Arbitrary for ValidDeclarations {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        let declaration = rule_record().prop_flat_map(|rule| {
            let prefix = rule.prefix.clone();
            (
                mixed_case(&rule.scope),
                mixed_case(rule.policy.as_str()),
                any::<bool>(),
            )
                .prop_map(move |(scope, policy, keep_empty)| RawRule {
                    scope: Some(scope),
                    // An empty prefix and no prefix mean the same thing.
                    prefix: match &prefix {
                        Some(p) if p.is_empty() && !keep_empty => None,
                        other => other.clone(),
                    },
                    policy: Some(policy),
                })
        });
        prop::collection::vec(declaration, 0..=12)
            .prop_map(ValidDeclarations)
            .boxed()
    }
}

/// Generate a declaration that may or may not be valid.
pub fn raw_rule() -> impl Strategy<Value = RawRule> {
    let scope = prop_oneof![
        3 => scope().prop_map(|s| Some(s.as_str().to_string())),
        1 => Just(Some("acl".to_string())),
        1 => Just(None),
    ];
    let policy = prop_oneof![
        3 => policy().prop_map(|p| Some(p.as_str().to_string())),
        1 => Just(Some("list".to_string())),
        1 => Just(None),
    ];
    (scope, prop::option::of(prefix()), policy)
        .prop_map(|(scope, prefix, policy)| RawRule { scope, prefix, policy })
}

#[cfg(test)]
mod tests {
    use super::*;
    use consul_acl_core::{
        canonicalize, decode, encode, merge_rule_sets, sort_document, validate, RuleKey,
        ValidationError,
    };

    proptest! {
        #[test]
        fn test_encode_decode_preserves_rules(rules in rule_set(20)) {
            let decoded = decode(&encode(&rules)).unwrap();
            prop_assert!(decoded.same_rules(&rules));
        }

        #[test]
        fn test_unknown_policy_text_round_trips(
            prefix in prefix(),
            policy in unknown_policy(),
        ) {
            let rules = RuleSet::from(vec![RuleRecord::prefixed("key", prefix, policy)]);
            let decoded = decode(&encode(&rules)).unwrap();
            prop_assert!(decoded.same_rules(&rules));
            prop_assert!(canonicalize(&rules).unwrap().same_rules(&rules));
        }

        #[test]
        fn test_encode_is_idempotent(rules in rule_set(20)) {
            let document = encode(&rules);
            prop_assert_eq!(encode(&decode(&document).unwrap()), document);
        }

        #[test]
        fn test_encode_ignores_order(rules in rule_set(20)) {
            let reversed: RuleSet = rules.iter().rev().cloned().collect();
            prop_assert_eq!(encode(&rules), encode(&reversed));
        }

        #[test]
        fn test_sort_document_is_idempotent(a in rule_set(10), b in rule_set(10)) {
            let document = format!("{}{}", encode(&b), encode(&a));
            let once = sort_document(&document);
            prop_assert_eq!(sort_document(&once), once.clone());
            prop_assert_eq!(once, sort_document(&format!("{}{}", encode(&a), encode(&b))));
        }

        #[test]
        fn test_merge_is_symmetric(a in rule_set(12), b in rule_set(12)) {
            let ab = merge_rule_sets(&a, &b).unwrap();
            let ba = merge_rule_sets(&b, &a).unwrap();
            prop_assert_eq!(encode(&ab), encode(&ba));
        }

        #[test]
        fn test_merge_keeps_most_permissive(a in rule_set(12), b in rule_set(12)) {
            let merged = merge_rule_sets(&a, &b).unwrap();
            prop_assert!(merged.has_unique_keys());

            let mut best: BTreeMap<RuleKey, Policy> = BTreeMap::new();
            for rule in a.iter().chain(b.iter()) {
                let entry = best.entry(rule.key()).or_insert_with(|| rule.policy.clone());
                if rule.policy.rank() < entry.rank() {
                    *entry = rule.policy.clone();
                }
            }
            prop_assert_eq!(merged.len(), best.len());
            for rule in merged.iter() {
                prop_assert_eq!(Some(&rule.policy), best.get(&rule.key()));
            }
        }

        #[test]
        fn test_valid_declarations_validate(decls: ValidDeclarations) {
            let validated = validate(&decls.0);
            prop_assert!(validated.is_valid());
            prop_assert_eq!(validated.rules.len(), decls.0.len());
            for rule in validated.rules.iter() {
                prop_assert_eq!(rule.scope.clone(), rule.scope.to_ascii_lowercase());
            }
        }

        #[test]
        fn test_validation_accounts_for_every_declaration(raw in prop::collection::vec(raw_rule(), 0..10)) {
            let validated = validate(&raw);
            let failed: std::collections::BTreeSet<usize> =
                validated.errors.iter().map(ValidationError::index).collect();
            prop_assert_eq!(validated.rules.len() + failed.len(), raw.len());
        }
    }
}
