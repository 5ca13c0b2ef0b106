//! TTL key-value session store.
//!
//! Sessions are serialized JSON documents stored under string keys with an
//! expiry. Reads past the expiry behave as if the key never existed. Two
//! backends: SQLite for persistence across restarts, in-memory for tests
//! and ephemeral deployments.

pub mod in_memory;
pub mod sqlite;

pub use in_memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tutoragent_config::{AppConfig, StoreBackend};
use tutoragent_core::StoreError;

/// Key prefix for plain chat sessions.
pub const CHAT_KEY_PREFIX: &str = "chat_session:";
/// Key prefix for document-backed chat sessions.
pub const PDF_CHAT_KEY_PREFIX: &str = "pdf_chat_session:";

/// Build the storage key for a plain chat session.
pub fn chat_key(session_id: &str) -> String {
    format!("{CHAT_KEY_PREFIX}{session_id}")
}

/// Build the storage key for a document-backed chat session.
pub fn pdf_chat_key(session_id: &str) -> String {
    format!("{PDF_CHAT_KEY_PREFIX}{session_id}")
}

/// Backend-agnostic TTL key-value contract.
///
/// All values are JSON. A key whose TTL has elapsed is indistinguishable
/// from a key that was never written.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Backend name for logs and health output.
    fn name(&self) -> &str;

    /// Fetch the value at `key`, or `None` if absent or expired.
    async fn get_json(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Write `value` at `key` with a fresh TTL, replacing any prior value.
    async fn set_json(
        &self,
        key: &str,
        value: &serde_json::Value,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Remove `key`. Returns whether a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Reset the TTL on an existing key. Returns false if the key is
    /// absent or already expired.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Verify the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Build the configured store backend.
pub async fn build_from_config(config: &AppConfig) -> Result<Arc<dyn SessionStore>, StoreError> {
    match config.store.backend {
        StoreBackend::Sqlite => {
            let path = config.store.path.to_string_lossy();
            Ok(Arc::new(SqliteStore::new(&path).await?))
        }
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_helpers() {
        assert_eq!(chat_key("abc"), "chat_session:abc");
        assert_eq!(pdf_chat_key("abc"), "pdf_chat_session:abc");
    }
}
