//! In-memory backend for the session store.
//!
//! Nothing survives a restart. Expiry is lazy, like the SQLite backend.

use crate::SessionStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tutoragent_core::StoreError;

struct Entry {
    body: serde_json::Value,
    expires_at: DateTime<Utc>,
}

impl Entry {
    fn is_live(&self) -> bool {
        self.expires_at > Utc::now()
    }
}

/// Process-local session store.
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn deadline(ttl: Duration) -> DateTime<Utc> {
        Utc::now() + chrono::Duration::seconds(ttl.as_secs() as i64)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_json(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_live() => return Ok(Some(entry.body.clone())),
                None => return Ok(None),
                Some(_) => {}
            }
        }
        // Expired: drop the dead entry under the write lock.
        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn set_json(
        &self,
        key: &str,
        value: &serde_json::Value,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.is_live());
        entries.insert(
            key.to_string(),
            Entry {
                body: value.clone(),
                expires_at: Self::deadline(ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;
        Ok(entries.remove(key).is_some_and(|e| e.is_live()))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if entry.is_live() => {
                entry.expires_at = Self::deadline(ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
