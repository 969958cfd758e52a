//! Merging a rule set with inherited rules.
//!
//! Both inputs are canonical documents. Their lines are pooled, deduplicated
//! and sorted, so the result does not depend on which side a rule came from
//! or how the caller ordered things. The pooled document is then decoded and
//! scanned in line order, keeping one rule per `(scope, prefix)` key:
//!
//! - prefixed scopes: a later rule replaces an earlier one with the same
//!   prefix only when it is strictly more permissive;
//! - singleton scopes: a later rule replaces an earlier one when it is at
//!   least as permissive, so ties go to the rule seen last.
//!
//! The replacement only happens when the kept rule has a recognized policy.
//! Candidates with an unrecognized policy rank below every recognized one
//! and therefore replace it.

use tracing::{debug, trace};

use crate::canonical::{encode, sorted_lines};
use crate::decode::decode;
use crate::error::CoreError;
use crate::rule::{RuleRecord, RuleSet};
use crate::scope::{Scope, ScopeClass};

/// Merge a rule set's own document with an inherited document.
///
/// Fails only if the pooled document cannot be parsed; no partial result
/// is returned in that case.
pub fn merge(own: &str, inherited: &str) -> Result<RuleSet, CoreError> {
    let combined = sorted_lines([own, inherited]).join("\n");
    let candidates = decode(&combined)?;

    let mut merged = RuleSet::new();
    for candidate in candidates {
        match find_match(&merged, &candidate) {
            Some((index, class)) => {
                let kept = &merged.as_slice()[index];
                if supersedes(&candidate, kept, class) {
                    debug!(
                        scope = %candidate.scope,
                        prefix = ?candidate.prefix,
                        from = %kept.policy,
                        to = %candidate.policy,
                        "merged rule replaced"
                    );
                    merged.replace(index, candidate);
                } else {
                    trace!(scope = %candidate.scope, prefix = ?candidate.prefix, "merged rule kept");
                }
            }
            None => merged.push(candidate),
        }
    }

    Ok(merged)
}

/// Merge two rule sets by way of their canonical documents.
pub fn merge_rule_sets(own: &RuleSet, inherited: &RuleSet) -> Result<RuleSet, CoreError> {
    merge(&encode(own), &encode(inherited))
}

/// Index of the kept rule sharing `candidate`'s key, with the scope class.
///
/// Rules for scopes outside the registry never match and are always kept.
fn find_match(merged: &RuleSet, candidate: &RuleRecord) -> Option<(usize, ScopeClass)> {
    let class = Scope::parse(&candidate.scope)?.class();
    merged
        .iter()
        .position(|kept| {
            kept.scope.eq_ignore_ascii_case(&candidate.scope)
                && match class {
                    ScopeClass::Prefixed => match (&candidate.prefix, &kept.prefix) {
                        (Some(a), Some(b)) => a == b,
                        _ => false,
                    },
                    ScopeClass::Singleton => true,
                }
        })
        .map(|index| (index, class))
}

fn supersedes(candidate: &RuleRecord, kept: &RuleRecord, class: ScopeClass) -> bool {
    let kept_rank = kept.policy.rank();
    if kept_rank.is_none() {
        return false;
    }
    let candidate_rank = candidate.policy.rank();
    match class {
        ScopeClass::Prefixed => candidate_rank < kept_rank,
        ScopeClass::Singleton => candidate_rank <= kept_rank,
    }
}
