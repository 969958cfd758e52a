//! # Consul ACL Store
//!
//! Storage abstraction for the ACL token manager. The remote service is
//! reached only through the [`Store`] trait; [`MemoryStore`] implements it
//! in memory for tests and dry runs.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all token operations
//! - [`MemoryStore`] - In-memory storage
//! - [`AclEntry`] - A legacy token carrying a rule document
//! - [`AclToken`] - A token linked to named policies
//!
//! ## Usage
//!
//! ```rust,no_run
//! use consul_acl_store::{AclEntry, MemoryStore, Store};
//!
//! async fn example() {
//!     let store = MemoryStore::new();
//!     let id = store
//!         .create_token(&AclEntry {
//!             name: "web".into(),
//!             token_type: "client".into(),
//!             rules: "operator = \"read\"\n".into(),
//!             ..Default::default()
//!         })
//!         .await
//!         .unwrap();
//!     let entry = store.read_token(&id).await.unwrap();
//!     assert!(entry.is_some());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Absent is not an error**: reads return `None` for unknown tokens
//! - **Idempotent deletes**: deleting a missing token succeeds
//! - **Rules are checked on write**: documents that do not parse are rejected

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use traits::{AclEntry, AclToken, PolicyLink, Store, StoreExt};
