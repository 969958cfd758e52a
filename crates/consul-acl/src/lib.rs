//! # Consul ACL
//!
//! Token management on top of the ACL rule compiler.
//!
//! ## Overview
//!
//! - **Planning**: rule declarations are validated, merged with inherited
//!   rules and rendered as one canonical document
//! - **Lifecycle**: tokens are created, read, updated and deleted through a
//!   [`Store`](store::Store)
//! - **Drift**: a stored token is compared against its spec rule by rule
//! - **Bindings**: named policies are attached to and detached from
//!   policy tokens
//!
//! ## Usage
//!
//! ```rust,no_run
//! use consul_acl::{ManagerConfig, TokenManager, TokenSpec, TokenType};
//! use consul_acl::core::RawRule;
//! use consul_acl::store::MemoryStore;
//!
//! async fn example() {
//!     let manager = TokenManager::new(MemoryStore::new(), ManagerConfig::default()).unwrap();
//!
//!     let spec = TokenSpec::new("web", TokenType::Client)
//!         .rule(RawRule::new("key", "write").with_prefix("web/"))
//!         .inherit(RawRule::new("operator", "read"));
//!
//!     let state = manager.create(&spec).await.unwrap();
//!     println!("{}", state.document());
//!
//!     let drift = manager.diff(&state.token, &spec).await.unwrap();
//!     assert!(drift.is_empty());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `consul_acl::core` - The rule compiler (validate, encode, decode, merge)
//! - `consul_acl::store` - Store trait and in-memory store

pub mod config;
pub mod error;
pub mod token;

// Re-export component crates
pub use consul_acl_core as core;
pub use consul_acl_store as store;

pub use config::{ClientConfig, ManagerConfig};
pub use error::{AclError, Result};
pub use token::{
    fingerprint, Change, Drift, PolicyBinding, RuleDiff, TokenLookup, TokenManager, TokenSpec,
    TokenState, TokenType,
};

// Re-export commonly used core types
pub use consul_acl_core::{Policy, RawRule, RuleRecord, RuleSet};
