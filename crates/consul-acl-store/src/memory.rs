//! In-memory implementation of the Store trait.
//!
//! Behaves like the service for the operations the manager uses: ids are
//! generated when not supplied, duplicate ids are rejected, and rule
//! documents must parse before they are accepted.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::debug;

use consul_acl_core::parse_document;

use crate::error::{Result, StoreError};
use crate::traits::{AclEntry, AclToken, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Rule tokens indexed by id.
    entries: HashMap<String, AclEntry>,

    /// Policy tokens indexed by accessor.
    tokens: HashMap<String, AclToken>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    /// Number of rule tokens held.
    pub fn token_count(&self) -> Result<usize> {
        Ok(self.read()?.entries.len())
    }

    /// Number of policy tokens held.
    pub fn acl_token_count(&self) -> Result<usize> {
        Ok(self.read()?.tokens.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A random identifier in the service's 8-4-4-4-12 hex layout.
fn generate_id() -> String {
    let hex = hex::encode(rand::random::<[u8; 16]>());
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

fn check_entry(entry: &AclEntry) -> Result<()> {
    match entry.token_type.as_str() {
        "client" | "management" => {}
        other => return Err(StoreError::InvalidData(format!("invalid token type {other:?}"))),
    }
    check_rules(&entry.rules)
}

fn check_rules(rules: &str) -> Result<()> {
    parse_document(rules)
        .map(|_| ())
        .map_err(|e| StoreError::InvalidData(format!("failed to parse ACL rules: {e}")))
}

#[async_trait]
impl Store for MemoryStore {
    // ─────────────────────────────────────────────────────────────────────────
    // Rule Tokens
    // ─────────────────────────────────────────────────────────────────────────

    async fn create_token(&self, entry: &AclEntry) -> Result<String> {
        check_entry(entry)?;

        let mut inner = self.write()?;
        let id = if entry.id.is_empty() {
            generate_id()
        } else {
            entry.id.clone()
        };
        if inner.entries.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }

        let mut stored = entry.clone();
        stored.id = id.clone();
        inner.entries.insert(id.clone(), stored);
        debug!(name = %entry.name, "rule token stored");
        Ok(id)
    }

    async fn read_token(&self, id: &str) -> Result<Option<AclEntry>> {
        Ok(self.read()?.entries.get(id).cloned())
    }

    async fn update_token(&self, entry: &AclEntry) -> Result<()> {
        check_entry(entry)?;

        let mut inner = self.write()?;
        match inner.entries.get_mut(&entry.id) {
            Some(stored) => {
                *stored = entry.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(entry.id.clone())),
        }
    }

    async fn delete_token(&self, id: &str) -> Result<()> {
        self.write()?.entries.remove(id);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Policy Tokens
    // ─────────────────────────────────────────────────────────────────────────

    async fn create_acl_token(&self, token: &AclToken) -> Result<AclToken> {
        check_rules(&token.rules)?;

        let mut inner = self.write()?;
        let mut stored = token.clone();
        if stored.accessor_id.is_empty() {
            stored.accessor_id = generate_id();
        }
        if stored.secret_id.is_empty() {
            stored.secret_id = generate_id();
        }
        if inner.tokens.contains_key(&stored.accessor_id) {
            return Err(StoreError::AlreadyExists(stored.accessor_id));
        }

        inner
            .tokens
            .insert(stored.accessor_id.clone(), stored.clone());
        debug!(accessor = %stored.accessor_id, "policy token stored");
        Ok(stored)
    }

    async fn read_acl_token(&self, accessor: &str) -> Result<Option<AclToken>> {
        Ok(self.read()?.tokens.get(accessor).cloned())
    }

    async fn update_acl_token(&self, token: &AclToken) -> Result<AclToken> {
        check_rules(&token.rules)?;

        let mut inner = self.write()?;
        let stored = inner
            .tokens
            .get_mut(&token.accessor_id)
            .ok_or_else(|| StoreError::NotFound(token.accessor_id.clone()))?;

        let secret_id = if token.secret_id.is_empty() {
            stored.secret_id.clone()
        } else {
            token.secret_id.clone()
        };
        *stored = AclToken {
            secret_id,
            ..token.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_acl_token(&self, accessor: &str) -> Result<()> {
        self.write()?.tokens.remove(accessor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{PolicyLink, StoreExt};

    fn entry(rules: &str) -> AclEntry {
        AclEntry {
            id: String::new(),
            name: "test".into(),
            token_type: "client".into(),
            rules: rules.into(),
        }
    }

    #[tokio::test]
    async fn test_create_and_read_token() {
        let store = MemoryStore::new();
        let id = store.create_token(&entry("operator = \"read\"\n")).await.unwrap();

        let read = store.read_token(&id).await.unwrap().unwrap();
        assert_eq!(read.id, id);
        assert_eq!(read.rules, "operator = \"read\"\n");
        assert_eq!(store.token_count().unwrap(), 1);
    }

    #[test]
    fn test_generated_id_layout() {
        let id = generate_id();
        let parts: Vec<_> = id.split('-').map(str::len).collect();
        assert_eq!(parts, vec![8, 4, 4, 4, 12]);
        assert_ne!(id, generate_id());
    }

    #[tokio::test]
    async fn test_explicit_id_conflict() {
        let store = MemoryStore::new();
        let mut e = entry("");
        e.id = "secret".into();
        assert_eq!(store.create_token(&e).await.unwrap(), "secret");
        assert!(matches!(
            store.create_token(&e).await,
            Err(StoreError::AlreadyExists(id)) if id == "secret"
        ));
    }

    #[tokio::test]
    async fn test_rejects_unparseable_rules() {
        let store = MemoryStore::new();
        let result = store.create_token(&entry("key \"a\" {")).await;
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
        assert_eq!(store.token_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rejects_bad_token_type() {
        let store = MemoryStore::new();
        let mut e = entry("");
        e.token_type = "admin".into();
        assert!(matches!(
            store.create_token(&e).await,
            Err(StoreError::InvalidData(_))
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete_token() {
        let store = MemoryStore::new();
        let id = store.create_token(&entry("")).await.unwrap();

        let mut updated = entry("keyring = \"write\"\n");
        updated.id = id.clone();
        store.update_token(&updated).await.unwrap();
        assert_eq!(
            store.read_token(&id).await.unwrap().unwrap().rules,
            "keyring = \"write\"\n"
        );

        store.delete_token(&id).await.unwrap();
        assert!(!store.token_exists(&id).await.unwrap());
        // Second delete is a no-op.
        store.delete_token(&id).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_missing_token() {
        let store = MemoryStore::new();
        let mut e = entry("");
        e.id = "nope".into();
        assert!(matches!(
            store.update_token(&e).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_acl_token_lifecycle() {
        let store = MemoryStore::new();
        let created = store
            .create_acl_token(&AclToken {
                description: "ci".into(),
                policies: vec![PolicyLink::named("readers")],
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(!created.accessor_id.is_empty());
        assert!(!created.secret_id.is_empty());

        let mut token = store.require_acl_token(&created.accessor_id).await.unwrap();
        assert!(token.has_policy("readers"));

        token.policies.clear();
        token.secret_id.clear();
        let updated = store.update_acl_token(&token).await.unwrap();
        assert!(updated.policies.is_empty());
        assert_eq!(updated.secret_id, created.secret_id);

        store.delete_acl_token(&created.accessor_id).await.unwrap();
        assert!(store
            .read_acl_token(&created.accessor_id)
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            store.require_acl_token(&created.accessor_id).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
