//! Key/value-and-set store seam
//!
//! The registry adapter speaks to its backing store through this trait:
//! string-keyed hashes and sets with the handful of primitives the
//! adapter needs. Production deployments back it with a shared store
//! such as Redis; tests inject `MemoryStore`. The handle is always passed
//! into the adapter's constructor, never reached through ambient state.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

/// Error raised by a store backend
///
/// Carries the backend's own description; the registry layer propagates
/// it without retrying.
#[derive(Debug)]
pub struct StoreError {
    message: String,
}

impl StoreError {
    /// Create a store error from a backend description
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StoreError {}

/// Asynchronous string-keyed hash/set store
///
/// Every operation is an independent key-level call; callers must not
/// assume multi-key atomicity.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Set fields on the hash at `key`, creating it if absent
    async fn hset(&self, key: &str, fields: &[(&str, &str)]) -> Result<(), StoreError>;

    /// Read every field of the hash at `key` (empty map if absent)
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StoreError>;

    /// Add members to the set at `key`, creating it if absent
    async fn sadd(&self, key: &str, members: &[&str]) -> Result<(), StoreError>;

    /// Read every member of the set at `key` (empty if absent)
    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// Remove members from the set at `key`
    async fn srem(&self, key: &str, members: &[&str]) -> Result<(), StoreError>;

    /// Delete the given keys, hash or set alike
    async fn del(&self, keys: &[&str]) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    async fn hset(&self, key: &str, fields: &[(&str, &str)]) -> Result<(), StoreError> {
        (**self).hset(key, fields).await
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        (**self).hgetall(key).await
    }

    async fn sadd(&self, key: &str, members: &[&str]) -> Result<(), StoreError> {
        (**self).sadd(key, members).await
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError> {
        (**self).smembers(key).await
    }

    async fn srem(&self, key: &str, members: &[&str]) -> Result<(), StoreError> {
        (**self).srem(key, members).await
    }

    async fn del(&self, keys: &[&str]) -> Result<(), StoreError> {
        (**self).del(keys).await
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    hashes: HashMap<String, HashMap<String, String>>,
    sets: HashMap<String, HashSet<String>>,
}

/// In-process store fake
///
/// Mirrors the key semantics of the real backend closely enough for the
/// adapter's tests: hashes merge on `hset`, and a set key disappears when
/// its last member is removed.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryInner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::new("memory store mutex poisoned"))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn hset(&self, key: &str, fields: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let hash = inner.hashes.entry(key.to_string()).or_default();

        for (field, value) in fields {
            hash.insert(field.to_string(), value.to_string());
        }

        Ok(())
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.hashes.get(key).cloned().unwrap_or_default())
    }

    async fn sadd(&self, key: &str, members: &[&str]) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let set = inner.sets.entry(key.to_string()).or_default();

        for member in members {
            set.insert(member.to_string());
        }

        Ok(())
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn srem(&self, key: &str, members: &[&str]) -> Result<(), StoreError> {
        let mut inner = self.lock()?;

        let now_empty = match inner.sets.get_mut(key) {
            Some(set) => {
                for member in members {
                    set.remove(*member);
                }
                set.is_empty()
            }
            None => false,
        };

        if now_empty {
            inner.sets.remove(key);
        }

        Ok(())
    }

    async fn del(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut inner = self.lock()?;

        for key in keys {
            inner.hashes.remove(*key);
            inner.sets.remove(*key);
        }

        Ok(())
    }
}
