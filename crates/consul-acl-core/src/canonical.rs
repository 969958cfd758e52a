//! Canonical rule documents.
//!
//! A canonical document has one rule per line, in one of two forms:
//!
//! ```text
//! <scope> = "<policy>"
//! <scope> "<prefix>" { policy = "<policy>" }
//! ```
//!
//! Lines are sorted by byte comparison and the document ends with a
//! newline. Everything is lower-cased, so two rule sets holding the same
//! rules always produce identical text regardless of declaration order or
//! input case. This is what makes stored documents comparable across reads.

use crate::decode::decode;
use crate::error::CoreError;
use crate::rule::{RuleRecord, RuleSet};

/// Render a single rule as one document line (no newline).
///
/// String contents are escaped so that any prefix or policy text, line
/// breaks included, stays on one line and decodes back unchanged. A scope
/// that is not a bare identifier is written as a quoted key.
pub fn encode_rule(rule: &RuleRecord) -> String {
    let scope = encode_scope(&rule.scope.to_ascii_lowercase());
    let policy = escape(&rule.policy.as_str().to_ascii_lowercase());

    match &rule.prefix {
        Some(prefix) => format!(
            "{} \"{}\" {{ policy = \"{}\" }}",
            scope,
            escape(&prefix.to_lowercase()),
            policy
        ),
        None => format!("{} = \"{}\"", scope, policy),
    }
}

/// Encode rules into a canonical document.
///
/// The empty set encodes to the empty string; otherwise every line,
/// including the last, is newline-terminated.
pub fn encode<'a, I>(rules: I) -> String
where
    I: IntoIterator<Item = &'a RuleRecord>,
{
    let mut lines: Vec<String> = rules.into_iter().map(encode_rule).collect();
    lines.sort();
    lines.push(String::new());
    lines.join("\n")
}

/// Sort the lines of a document, dropping blank and repeated lines.
///
/// The result has no trailing newline. Sorting is line-based, so this is
/// only meaningful for documents with one rule per line.
pub fn sort_document(document: &str) -> String {
    sorted_lines(std::iter::once(document)).join("\n")
}

/// Sorted, deduplicated, non-empty lines of several documents.
pub(crate) fn sorted_lines<'a, I>(documents: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut lines: Vec<&str> = documents
        .into_iter()
        .flat_map(str::lines)
        .filter(|line| !line.is_empty())
        .collect();
    lines.sort_unstable();
    lines.dedup();
    lines
}

/// Put a rule set into canonical order.
///
/// Encodes, sorts and decodes again, so the returned set lists rules in
/// document order with duplicate lines folded together.
pub fn canonicalize(rules: &RuleSet) -> Result<RuleSet, CoreError> {
    decode(&sort_document(&encode(rules)))
}

fn encode_scope(scope: &str) -> String {
    if is_identifier(scope) {
        scope.to_string()
    } else {
        format!("\"{}\"", escape(scope))
    }
}

/// Whether `s` would be read back as a single identifier token.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        }
        _ => false,
    }
}

/// Escape text for a double-quoted document string.
fn escape(s: &str) -> String {
    if !s.contains(['"', '\\', '\n', '\r', '\t']) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Policy;

    #[test]
    fn test_encode_forms() {
        assert_eq!(
            encode_rule(&RuleRecord::prefixed("key", "foo/bar", Policy::Read)),
            r#"key "foo/bar" { policy = "read" }"#
        );
        assert_eq!(
            encode_rule(&RuleRecord::singleton("operator", Policy::Write)),
            r#"operator = "write""#
        );
    }

    #[test]
    fn test_encode_lowercases() {
        let rule = RuleRecord::prefixed("KEY", "Foo/Bar", Policy::Other("LIST".into()));
        assert_eq!(encode_rule(&rule), r#"key "foo/bar" { policy = "list" }"#);
    }

    #[test]
    fn test_encode_sorted_with_trailing_newline() {
        let rules = vec![
            RuleRecord::singleton("operator", Policy::Read),
            RuleRecord::prefixed("service", "", Policy::Read),
            RuleRecord::prefixed("key", "foo/bar/baz", Policy::Write),
            RuleRecord::prefixed("key", "foo/bar", Policy::Read),
        ];
        let expected = "key \"foo/bar\" { policy = \"read\" }\n\
                        key \"foo/bar/baz\" { policy = \"write\" }\n\
                        operator = \"read\"\n\
                        service \"\" { policy = \"read\" }\n";
        assert_eq!(encode(&rules), expected);
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode(&RuleSet::new()), "");
    }

    #[test]
    fn test_encode_is_order_independent() {
        let a = vec![
            RuleRecord::singleton("keyring", Policy::Write),
            RuleRecord::prefixed("node", "", Policy::Deny),
        ];
        let b: Vec<_> = a.iter().rev().cloned().collect();
        assert_eq!(encode(&a), encode(&b));
    }

    #[test]
    fn test_escape_prefix() {
        let rule = RuleRecord::prefixed("key", r#"a"b\c"#, Policy::Read);
        assert_eq!(encode_rule(&rule), r#"key "a\"b\\c" { policy = "read" }"#);
    }

    #[test]
    fn test_escape_control_characters() {
        let rule = RuleRecord::prefixed("key", "a\nb\tc\rd", Policy::Read);
        let line = encode_rule(&rule);
        assert_eq!(line, r#"key "a\nb\tc\rd" { policy = "read" }"#);

        let rules = RuleSet::from(vec![rule]);
        let document = encode(&rules);
        assert_eq!(document.lines().count(), 1);
        assert!(decode(&document).unwrap().same_rules(&rules));
        assert!(canonicalize(&rules).unwrap().same_rules(&rules));
    }

    #[test]
    fn test_escape_policy_text() {
        let decoded = decode(r#"key "a" { policy = "x\"y" }"#).unwrap();
        assert_eq!(decoded.as_slice()[0].policy, Policy::Other("x\"y".into()));
        assert_eq!(encode(&decoded), "key \"a\" { policy = \"x\\\"y\" }\n");

        let canonical = canonicalize(&decoded).unwrap();
        assert!(canonical.same_rules(&decoded));
    }

    #[test]
    fn test_quoted_scope_round_trips() {
        let rules = RuleSet::from(vec![
            RuleRecord::singleton("odd scope", Policy::Read),
            RuleRecord::singleton("", Policy::Deny),
            RuleRecord::prefixed("9lives", "x", Policy::Write),
        ]);
        let document = encode(&rules);
        assert!(document.contains("\"odd scope\" = \"read\""));
        assert!(document.contains("\"\" = \"deny\""));
        assert!(decode(&document).unwrap().same_rules(&rules));
        assert!(canonicalize(&rules).unwrap().same_rules(&rules));
    }

    #[test]
    fn test_sort_document() {
        let doc = "operator = \"read\"\n\nkey \"a\" { policy = \"read\" }\noperator = \"read\"\n";
        assert_eq!(
            sort_document(doc),
            "key \"a\" { policy = \"read\" }\noperator = \"read\""
        );
        assert_eq!(sort_document(&sort_document(doc)), sort_document(doc));
        assert_eq!(sort_document(""), "");
    }

    #[test]
    fn test_canonicalize_orders_rules() {
        let rules = RuleSet::from(vec![
            RuleRecord::singleton("operator", Policy::Read),
            RuleRecord::prefixed("key", "b", Policy::Read),
            RuleRecord::prefixed("key", "a", Policy::Write),
        ]);
        let canonical = canonicalize(&rules).unwrap();
        let prefixes: Vec<_> = canonical.iter().map(|r| r.prefix.clone()).collect();
        assert_eq!(
            prefixes,
            vec![Some("a".to_string()), Some("b".to_string()), None]
        );
    }
}
