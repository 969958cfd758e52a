//! # Consul ACL Core
//!
//! The ACL rule compiler: pure functions over rule declarations and rule
//! documents.
//!
//! This crate contains no I/O. Every function takes immutable input and
//! returns freshly allocated output, so all of it can be called from any
//! number of threads without coordination.
//!
//! ## Key Types
//!
//! - [`RuleRecord`] - One rule: scope, optional prefix, policy
//! - [`RuleSet`] - An ordered collection of rules compared as a set
//! - [`RawRule`] - A rule declaration before validation
//! - [`Scope`] / [`Policy`] - Scope registry and permission levels
//!
//! ## Operations
//!
//! - [`validate`] - Raw declarations to rules, aggregating every error
//! - [`encode`] - Rules to a canonical, sorted document
//! - [`decode`] - A document back to rules (bare and block forms)
//! - [`merge`] - Own rules plus inherited rules, one rule per key
//!
//! ```rust
//! use consul_acl_core::{decode, encode, validate, RawRule};
//!
//! let raw = vec![
//!     RawRule::new("operator", "read"),
//!     RawRule::new("key", "write").with_prefix("foo/bar"),
//! ];
//! let rules = validate(&raw).into_result().unwrap();
//! let document = encode(&rules);
//! assert_eq!(
//!     document,
//!     "key \"foo/bar\" { policy = \"write\" }\noperator = \"read\"\n"
//! );
//! assert!(decode(&document).unwrap().same_rules(&rules));
//! ```

pub mod canonical;
pub mod decode;
pub mod document;
pub mod error;
pub mod merge;
pub mod policy;
pub mod rule;
pub mod scope;
pub mod validation;

pub use canonical::{canonicalize, encode, encode_rule, sort_document};
pub use decode::decode;
pub use document::{parse_document, Document, Item, Value};
pub use error::{CoreError, ValidationError, ValidationErrors};
pub use merge::{merge, merge_rule_sets};
pub use policy::Policy;
pub use rule::{RawRule, RuleKey, RuleRecord, RuleSet};
pub use scope::{all_scopes, is_prefixed, is_singleton, Scope, ScopeClass};
pub use validation::{validate, Validated};
