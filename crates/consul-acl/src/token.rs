//! Token lifecycle over a [`Store`].
//!
//! The manager turns a [`TokenSpec`] into a canonical rule document, keeps
//! the service in step with it, and reports drift when the stored token has
//! been changed out of band. Secrets never appear in errors or logs; tokens
//! are identified there by their [`fingerprint`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use consul_acl_core::{
    canonicalize, decode, encode, merge_rule_sets, validate, RawRule, RuleRecord, RuleSet,
};
use consul_acl_store::{AclEntry, PolicyLink, Store, StoreExt};

use crate::config::ManagerConfig;
use crate::error::{AclError, Result};

/// Hex-encoded BLAKE3 digest, used as the stable identifier of a secret.
pub fn fingerprint(value: &str) -> String {
    hex::encode(blake3::hash(value.as_bytes()).as_bytes())
}

/// Kind of rule token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TokenType {
    #[default]
    Client,
    Management,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Client => "client",
            TokenType::Management => "management",
        }
    }
}

impl FromStr for TokenType {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "client" => Ok(TokenType::Client),
            "management" => Ok(TokenType::Management),
            _ => Err(AclError::InvalidTokenType(s.to_string())),
        }
    }
}

impl TryFrom<String> for TokenType {
    type Error = AclError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<TokenType> for String {
    fn from(t: TokenType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Desired state of a rule token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenSpec {
    pub name: String,
    /// Secret to create the token with; generated by the service if unset.
    pub token: Option<String>,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    #[serde(rename = "rule")]
    pub rules: Vec<RawRule>,
    /// Rules merged in from other tokens.
    pub inherits: Vec<RawRule>,
}

impl TokenSpec {
    pub fn new(name: impl Into<String>, token_type: TokenType) -> Self {
        Self {
            name: name.into(),
            token_type,
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn rule(mut self, rule: RawRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn inherit(mut self, rule: RawRule) -> Self {
        self.inherits.push(rule);
        self
    }
}

/// A rule token as read back from the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenState {
    /// [`fingerprint`] of the secret.
    pub id: String,
    pub token: String,
    pub name: String,
    pub token_type: TokenType,
    pub rules: RuleSet,
}

impl TokenState {
    /// The rules as a canonical document.
    pub fn document(&self) -> String {
        encode(&self.rules)
    }
}

/// An attribute whose stored value differs from the desired one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change<T> {
    pub expected: T,
    pub actual: T,
}

impl<T: PartialEq> Change<T> {
    fn between(expected: T, actual: T) -> Option<Self> {
        (expected != actual).then_some(Self { expected, actual })
    }
}

/// Rules present on only one side, in canonical order.
///
/// Rules are compared in normalized form, so stored text that differs
/// only in case is not drift.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleDiff {
    /// Planned but not stored.
    pub added: Vec<RuleRecord>,
    /// Stored but not planned.
    pub removed: Vec<RuleRecord>,
}

impl RuleDiff {
    pub fn between(planned: &RuleSet, stored: &RuleSet) -> Self {
        let planned: BTreeSet<RuleRecord> = planned.iter().map(RuleRecord::normalized).collect();
        let stored: BTreeSet<RuleRecord> = stored.iter().map(RuleRecord::normalized).collect();
        Self {
            added: planned.difference(&stored).cloned().collect(),
            removed: stored.difference(&planned).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Difference between a [`TokenSpec`] and the stored token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drift {
    /// The token no longer exists; nothing else is compared.
    pub missing: bool,
    pub name: Option<Change<String>>,
    pub token_type: Option<Change<TokenType>>,
    pub rules: RuleDiff,
}

impl Drift {
    pub fn is_empty(&self) -> bool {
        !self.missing && self.name.is_none() && self.token_type.is_none() && self.rules.is_empty()
    }
}

/// A policy attached to a policy token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyBinding {
    /// [`fingerprint`] of accessor and policy name.
    pub id: String,
    pub accessor: String,
    pub policy: String,
}

impl PolicyBinding {
    fn new(accessor: &str, policy: &str) -> Self {
        Self {
            id: fingerprint(&format!("{accessor}{policy}")),
            accessor: accessor.to_string(),
            policy: policy.to_string(),
        }
    }
}

/// Secret and rules of a policy token, found by accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLookup {
    pub accessor: String,
    pub secret: String,
    pub rules: RuleSet,
}

/// Manages ACL tokens through a [`Store`].
pub struct TokenManager<S: Store> {
    store: Arc<S>,
    config: ManagerConfig,
}

impl<S: Store> TokenManager<S> {
    /// Create a manager, checking the client configuration first.
    pub fn new(store: S, config: ManagerConfig) -> Result<Self> {
        Self::with_shared(Arc::new(store), config)
    }

    /// Create a manager over a store that is shared with other users.
    pub fn with_shared(store: Arc<S>, config: ManagerConfig) -> Result<Self> {
        config.client.validate()?;
        Ok(Self { store, config })
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Planning
    // ─────────────────────────────────────────────────────────────────────────

    /// The canonical rule set a spec resolves to.
    ///
    /// Own and inherited declarations are validated together; if either
    /// block has problems, all of them are returned.
    pub fn plan(&self, spec: &TokenSpec) -> Result<RuleSet> {
        let own = validate(&spec.rules);
        if spec.inherits.is_empty() {
            let rules = own.into_result()?;
            return Ok(canonicalize(&rules)?);
        }

        let inherited = validate(&spec.inherits);
        if !own.is_valid() || !inherited.is_valid() {
            return Err(AclError::InvalidRuleBlocks {
                rules: own.errors.into(),
                inherits: inherited.errors.into(),
            });
        }

        let merged = merge_rule_sets(&own.rules, &inherited.rules)?;
        debug!(
            name = %spec.name,
            own = own.rules.len(),
            inherited = inherited.rules.len(),
            merged = merged.len(),
            "inherited rules merged"
        );
        Ok(canonicalize(&merged)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rule Tokens
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a token from a spec and return it as stored.
    pub async fn create(&self, spec: &TokenSpec) -> Result<TokenState> {
        let rules = self.plan(spec)?;
        let entry = AclEntry {
            id: spec.token.clone().unwrap_or_default(),
            name: spec.name.clone(),
            token_type: spec.token_type.to_string(),
            rules: encode(&rules),
        };

        let token = self.store.create_token(&entry).await?;
        info!(name = %spec.name, id = %fingerprint(&token), rules = rules.len(), "token created");
        self.import(&token).await
    }

    /// Read a token; `None` if the service no longer has it.
    pub async fn read(&self, token: &str) -> Result<Option<TokenState>> {
        match self.store.read_token(token).await? {
            Some(entry) => self.state_from_entry(entry).map(Some),
            None => {
                debug!(id = %fingerprint(token), "token not present");
                Ok(None)
            }
        }
    }

    /// Adopt an existing token.
    pub async fn import(&self, token: &str) -> Result<TokenState> {
        self.read(token)
            .await?
            .ok_or_else(|| AclError::TokenNotFound(fingerprint(token)))
    }

    /// Replace name, type and rules of an existing token.
    pub async fn update(&self, token: &str, spec: &TokenSpec) -> Result<TokenState> {
        let rules = self.plan(spec)?;
        if !self.store.token_exists(token).await? {
            warn!(id = %fingerprint(token), "token vanished before update");
            return Err(AclError::TokenNotFound(fingerprint(token)));
        }

        self.store
            .update_token(&AclEntry {
                id: token.to_string(),
                name: spec.name.clone(),
                token_type: spec.token_type.to_string(),
                rules: encode(&rules),
            })
            .await?;
        info!(name = %spec.name, id = %fingerprint(token), "token updated");
        self.import(token).await
    }

    /// Delete a token. Deleting a token that is already gone succeeds.
    pub async fn delete(&self, token: &str) -> Result<()> {
        self.store.delete_token(token).await?;
        info!(id = %fingerprint(token), "token deleted");
        Ok(())
    }

    pub async fn exists(&self, token: &str) -> Result<bool> {
        Ok(self.store.token_exists(token).await?)
    }

    /// Compare a spec with what the service holds.
    pub async fn diff(&self, token: &str, spec: &TokenSpec) -> Result<Drift> {
        let planned = self.plan(spec)?;
        let Some(state) = self.read(token).await? else {
            warn!(id = %fingerprint(token), "token vanished");
            return Ok(Drift {
                missing: true,
                ..Default::default()
            });
        };

        Ok(Drift {
            missing: false,
            name: Change::between(spec.name.clone(), state.name),
            token_type: Change::between(spec.token_type, state.token_type),
            rules: RuleDiff::between(&planned, &state.rules),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Policy Tokens
    // ─────────────────────────────────────────────────────────────────────────

    /// Attach a policy to a token. Binding an attached policy changes nothing.
    pub async fn bind_policy(&self, accessor: &str, policy: &str) -> Result<PolicyBinding> {
        let mut token = self.store.require_acl_token(accessor).await?;
        let binding = PolicyBinding::new(accessor, policy);
        if token.has_policy(policy) {
            debug!(accessor, policy, "policy already bound");
            return Ok(binding);
        }

        token.policies.push(PolicyLink::named(policy));
        self.store.update_acl_token(&token).await?;
        info!(accessor, policy, "policy bound");
        Ok(binding)
    }

    /// Detach a policy. Returns whether anything was removed; a missing
    /// token has no bindings and is not an error.
    pub async fn unbind_policy(&self, accessor: &str, policy: &str) -> Result<bool> {
        let Some(mut token) = self.store.read_acl_token(accessor).await? else {
            debug!(accessor, "token not present, nothing to unbind");
            return Ok(false);
        };
        let Some(index) = token.policy_index(policy) else {
            return Ok(false);
        };

        token.policies.remove(index);
        self.store.update_acl_token(&token).await?;
        info!(accessor, policy, "policy unbound");
        Ok(true)
    }

    pub async fn is_bound(&self, accessor: &str, policy: &str) -> Result<bool> {
        Ok(self
            .store
            .require_acl_token(accessor)
            .await?
            .has_policy(policy))
    }

    /// Secret and decoded rules of a policy token.
    pub async fn lookup(&self, accessor: &str) -> Result<Option<TokenLookup>> {
        let Some(token) = self.store.read_acl_token(accessor).await? else {
            return Ok(None);
        };
        Ok(Some(TokenLookup {
            rules: self.read_rules(&token.rules)?,
            accessor: token.accessor_id,
            secret: token.secret_id,
        }))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn state_from_entry(&self, entry: AclEntry) -> Result<TokenState> {
        let token_type = entry.token_type.parse()?;
        let rules = self.read_rules(&entry.rules)?;
        Ok(TokenState {
            id: fingerprint(&entry.id),
            token: entry.id,
            name: entry.name,
            token_type,
            rules,
        })
    }

    fn read_rules(&self, document: &str) -> Result<RuleSet> {
        let decoded = decode(document)?;
        if self.config.canonicalize_reads {
            Ok(canonicalize(&decoded)?)
        } else {
            Ok(decoded)
        }
    }
}
