//! # Consul ACL Testkit
//!
//! Testing utilities for the ACL rule compiler and token manager.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden documents**: Stored rule documents that must never change shape
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A token manager over an in-memory store, and sample specs
//!
//! ## Golden Documents
//!
//! ```rust
//! use consul_acl_core::{decode, encode};
//! use consul_acl_testkit::vectors::all_vectors;
//!
//! for vector in all_vectors() {
//!     let rules = decode(vector.input).unwrap();
//!     assert_eq!(encode(&rules), vector.canonical);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use consul_acl_core::{decode, encode};
//! use consul_acl_testkit::generators::rule_set;
//!
//! proptest! {
//!     #[test]
//!     fn round_trip(rules in rule_set(20)) {
//!         prop_assert!(decode(&encode(&rules)).unwrap().same_rules(&rules));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use consul_acl_testkit::fixtures::TestFixture;
//!
//! async fn example() {
//!     let fixture = TestFixture::new();
//!     let token = fixture.create_original().await.unwrap();
//!     println!("{}", token.document());
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::TestFixture;
