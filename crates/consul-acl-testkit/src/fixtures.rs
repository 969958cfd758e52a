//! Test fixtures and helpers.
//!
//! Common setup code for token manager tests.

use consul_acl::{ManagerConfig, Result, TokenManager, TokenSpec, TokenState, TokenType};
use consul_acl_core::{decode, RawRule};
use consul_acl_store::{AclToken, MemoryStore, PolicyLink, Store};

use crate::vectors::{RULES_CHILD, RULES_ORIGINAL, RULES_SECOND, RULES_UPDATED};

/// A token manager over a fresh in-memory store.
pub struct TestFixture {
    pub manager: TokenManager<MemoryStore>,
}

impl TestFixture {
    /// Create a new fixture with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            manager: TokenManager::new(MemoryStore::new(), config)
                .expect("fixture configuration is valid"),
        }
    }

    pub fn store(&self) -> &MemoryStore {
        self.manager.store()
    }

    /// Create a rule token from [`original_spec`].
    pub async fn create_original(&self) -> Result<TokenState> {
        self.manager.create(&original_spec()).await
    }

    /// Create a policy token linked to the given policies.
    pub async fn create_policy_token(&self, description: &str, policies: &[&str]) -> AclToken {
        self.store()
            .create_acl_token(&AclToken {
                description: description.to_string(),
                policies: policies.iter().copied().map(PolicyLink::named).collect(),
                rules: RULES_SECOND.to_string(),
                ..Default::default()
            })
            .await
            .expect("memory store accepts policy tokens")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Declarations equivalent to a canonical document.
pub fn declarations(document: &str) -> Vec<RawRule> {
    decode(document)
        .expect("fixture document parses")
        .iter()
        .map(RawRule::from)
        .collect()
}

/// A client token holding [`RULES_ORIGINAL`].
pub fn original_spec() -> TokenSpec {
    TokenSpec {
        rules: declarations(RULES_ORIGINAL),
        ..TokenSpec::new("original", TokenType::Client)
    }
}

/// [`original_spec`] with its rules replaced by [`RULES_UPDATED`].
pub fn updated_spec() -> TokenSpec {
    TokenSpec {
        rules: declarations(RULES_UPDATED),
        ..original_spec()
    }
}

/// A token with its own [`RULES_CHILD`] inheriting everything `parent` has
/// plus [`RULES_SECOND`].
pub fn inherited_spec(parent: &TokenState) -> TokenSpec {
    let mut inherits: Vec<RawRule> = parent.rules.iter().map(RawRule::from).collect();
    inherits.extend(declarations(RULES_SECOND));
    TokenSpec {
        rules: declarations(RULES_CHILD),
        inherits,
        ..TokenSpec::new("inherited", TokenType::Client)
    }
}
