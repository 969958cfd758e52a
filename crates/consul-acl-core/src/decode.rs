//! Rule document decoding.
//!
//! A scope appears in one of two shapes:
//!
//! ```text
//! operator = "read"                       # bare assignment, no prefix
//! key "foo/bar" { policy = "write" }      # block, one per prefix
//! ```
//!
//! Documents written by hand may also spell the block form as a nested
//! object (`key { "foo/bar" { policy = "write" } }`); that is accepted too.
//! Decoding is best-effort below the top level: a block with no scalar
//! `policy` contributes nothing and other unrecognized shapes are skipped.
//! Only text that does not parse at all is an error.

use tracing::debug;

use crate::document::{parse_document, Item, Value};
use crate::error::CoreError;
use crate::policy::Policy;
use crate::rule::{RuleRecord, RuleSet};

/// Decode a rule document, keeping rules in document order.
pub fn decode(document: &str) -> Result<RuleSet, CoreError> {
    let parsed = parse_document(document)?;
    let mut rules = RuleSet::new();
    for item in &parsed.items {
        decode_scope(item, &mut rules);
    }
    Ok(rules)
}

fn decode_scope(item: &Item, rules: &mut RuleSet) {
    match (item.labels.as_slice(), &item.value) {
        ([], Value::Scalar(policy)) => {
            rules.push(RuleRecord::singleton(item.key.as_str(), Policy::parse(policy)));
        }
        ([prefix], Value::Object(body)) => {
            decode_prefix(&item.key, prefix, body, item.line, rules);
        }
        ([], Value::Object(entries)) => {
            for entry in entries {
                match (entry.labels.as_slice(), &entry.value) {
                    ([], Value::Object(body)) => {
                        decode_prefix(&item.key, &entry.key, body, entry.line, rules)
                    }
                    _ => debug!(
                        scope = %item.key,
                        line = entry.line,
                        "skipping nested entry that is not a prefix block"
                    ),
                }
            }
        }
        _ => debug!(
            scope = %item.key,
            line = item.line,
            "skipping scope with unrecognized shape"
        ),
    }
}

fn decode_prefix(scope: &str, prefix: &str, body: &[Item], line: usize, rules: &mut RuleSet) {
    match policy_of(body) {
        Some(policy) => rules.push(RuleRecord::prefixed(scope, prefix, Policy::parse(policy))),
        // TODO: surface this to callers once the token store is known to
        // never emit policy-less blocks; for now the entry is dropped.
        None => debug!(scope, prefix, line, "skipping prefix block without a policy"),
    }
}

/// The last `policy` assignment in a block body, if it is a scalar.
fn policy_of(body: &[Item]) -> Option<&str> {
    body.iter()
        .rev()
        .find(|item| item.key == "policy" && item.labels.is_empty())
        .and_then(|item| match &item.value {
            Value::Scalar(s) => Some(s.as_str()),
            _ => None,
        })
}
