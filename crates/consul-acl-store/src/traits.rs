//! Store trait: the narrow interface to the ACL service.
//!
//! The token manager only ever talks to the service through this trait, so
//! the compiler and lifecycle logic can be exercised against the in-memory
//! implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A legacy rule-carrying token.
///
/// `id` is the token secret itself. `rules` is the rule document exactly as
/// the service stores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    pub id: String,
    pub name: String,
    /// `client` or `management`.
    #[serde(rename = "type")]
    pub token_type: String,
    pub rules: String,
}

/// Link from a policy-based token to a named policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyLink {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

impl PolicyLink {
    /// Link by name; the service resolves the id.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
        }
    }
}

/// A policy-based token, addressed by its accessor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclToken {
    pub accessor_id: String,
    pub secret_id: String,
    pub description: String,
    pub policies: Vec<PolicyLink>,
    pub local: bool,
    /// Legacy rules still attached to the token, if any.
    #[serde(default)]
    pub rules: String,
}

impl AclToken {
    /// Position of the link to `policy`, matched by name.
    pub fn policy_index(&self, policy: &str) -> Option<usize> {
        self.policies.iter().position(|link| link.name == policy)
    }

    pub fn has_policy(&self, policy: &str) -> bool {
        self.policy_index(policy).is_some()
    }
}

/// The Store trait: async interface to the ACL service.
///
/// Reads return `Ok(None)` for tokens that do not exist; only operations
/// that need an existing token fail with `NotFound`.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Rule Tokens
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a rule token and return its id.
    ///
    /// An empty `entry.id` asks the store to generate one.
    async fn create_token(&self, entry: &AclEntry) -> Result<String>;

    /// Read a rule token by id.
    async fn read_token(&self, id: &str) -> Result<Option<AclEntry>>;

    /// Replace the name, type and rules of an existing rule token.
    async fn update_token(&self, entry: &AclEntry) -> Result<()>;

    /// Delete a rule token. Deleting a missing token is not an error.
    async fn delete_token(&self, id: &str) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Policy Tokens
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a policy token, returning it with any generated ids filled in.
    async fn create_acl_token(&self, token: &AclToken) -> Result<AclToken>;

    /// Read a policy token by accessor.
    async fn read_acl_token(&self, accessor: &str) -> Result<Option<AclToken>>;

    /// Replace an existing policy token.
    async fn update_acl_token(&self, token: &AclToken) -> Result<AclToken>;

    /// Delete a policy token. Deleting a missing token is not an error.
    async fn delete_acl_token(&self, accessor: &str) -> Result<()>;
}

/// Extension trait with convenience methods.
pub trait StoreExt: Store {
    /// Whether a rule token with this id exists.
    fn token_exists(&self, id: &str) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Read a policy token that must exist.
    fn require_acl_token(
        &self,
        accessor: &str,
    ) -> impl std::future::Future<Output = Result<AclToken>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn token_exists(&self, id: &str) -> Result<bool> {
        Ok(self.read_token(id).await?.is_some())
    }

    async fn require_acl_token(&self, accessor: &str) -> Result<AclToken> {
        self.read_acl_token(accessor)
            .await?
            .ok_or_else(|| crate::error::StoreError::NotFound(accessor.to_string()))
    }
}
