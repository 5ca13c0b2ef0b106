//! SQLite backend for the session store.
//!
//! One table, `kv_entries`, keyed by the session key with an absolute
//! expiry timestamp (unix seconds). Expiry is lazy: expired rows are
//! treated as absent on read and swept opportunistically on writes.

use crate::SessionStore;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use tutoragent_core::StoreError;

/// Persistent SQLite-backed session store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    ///
    /// Pass `":memory:"` for an in-process ephemeral database (useful for tests).
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite session store initialized at {path}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_entries (
                key        TEXT PRIMARY KEY,
                body       TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("kv_entries table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_kv_entries_expires_at ON kv_entries(expires_at)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("expires_at index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    /// Remove every expired row. Called opportunistically on writes.
    pub async fn purge_expired(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM kv_entries WHERE expires_at <= ?")
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("purge failed: {e}")))?;
        Ok(result.rows_affected())
    }

    fn deadline(ttl: Duration) -> i64 {
        Utc::now().timestamp() + ttl.as_secs() as i64
    }
}

#[async_trait]
impl SessionStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get_json(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let row = sqlx::query("SELECT body, expires_at FROM kv_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("get failed: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let expires_at: i64 = row
            .try_get("expires_at")
            .map_err(|e| StoreError::Storage(format!("bad expires_at column: {e}")))?;

        if expires_at <= Utc::now().timestamp() {
            // Lazy expiry: drop the dead row and report absence.
            sqlx::query("DELETE FROM kv_entries WHERE key = ?")
                .bind(key)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Storage(format!("expiry delete failed: {e}")))?;
            return Ok(None);
        }

        let body: String = row
            .try_get("body")
            .map_err(|e| StoreError::Storage(format!("bad body column: {e}")))?;

        let value = serde_json::from_str(&body).map_err(|e| StoreError::InvalidDocument {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Some(value))
    }

    async fn set_json(
        &self,
        key: &str,
        value: &serde_json::Value,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let body = serde_json::to_string(value).map_err(|e| StoreError::InvalidDocument {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, body, expires_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET body = excluded.body, expires_at = excluded.expires_at
            "#,
        )
        .bind(key)
        .bind(body)
        .bind(Self::deadline(ttl))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("set failed: {e}")))?;

        let _ = self.purge_expired().await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM kv_entries WHERE key = ? AND expires_at > ?")
            .bind(key)
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("delete failed: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE kv_entries SET expires_at = ? WHERE key = ? AND expires_at > ?")
                .bind(Self::deadline(ttl))
                .bind(key)
                .bind(Utc::now().timestamp())
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Storage(format!("expire failed: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn store() -> SqliteStore {
        SqliteStore::new(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn set_then_get() {
        let store = store().await;
        let doc = json!({"session_id": "s1", "messages": []});
        store
            .set_json("chat_session:s1", &doc, Duration::from_secs(60))
            .await
            .unwrap();

        let fetched = store.get_json("chat_session:s1").await.unwrap();
        assert_eq!(fetched, Some(doc));
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let store = store().await;
        assert_eq!(store.get_json("chat_session:nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn overwrite_replaces_value() {
        let store = store().await;
        store
            .set_json("k", &json!({"v": 1}), Duration::from_secs(60))
            .await
            .unwrap();
        store
            .set_json("k", &json!({"v": 2}), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get_json("k").await.unwrap(), Some(json!({"v": 2})));
    }

    #[tokio::test]
    async fn expired_key_reads_as_absent() {
        let store = store().await;
        store
            .set_json("k", &json!({"v": 1}), Duration::from_secs(0))
            .await
            .unwrap();
        assert_eq!(store.get_json("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_returns_whether_key_existed() {
        let store = store().await;
        store
            .set_json("k", &json!(1), Duration::from_secs(60))
            .await
            .unwrap();
        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
    }

    #[tokio::test]
    async fn expire_refreshes_live_key_only() {
        let store = store().await;
        store
            .set_json("k", &json!(1), Duration::from_secs(60))
            .await
            .unwrap();
        assert!(store.expire("k", Duration::from_secs(120)).await.unwrap());
        assert!(!store.expire("gone", Duration::from_secs(120)).await.unwrap());
    }

    #[tokio::test]
    async fn purge_removes_expired_rows() {
        let store = store().await;
        store
            .set_json("dead", &json!(1), Duration::from_secs(0))
            .await
            .unwrap();
        store
            .set_json("live", &json!(2), Duration::from_secs(60))
            .await
            .unwrap();
        // set_json already purged once; another purge finds nothing new
        assert_eq!(store.purge_expired().await.unwrap(), 0);
        assert_eq!(store.get_json("live").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn ping_succeeds() {
        let store = store().await;
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn persists_across_file_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.db");
        let path_str = path.to_str().unwrap();

        {
            let store = SqliteStore::new(path_str).await.unwrap();
            store
                .set_json("k", &json!({"kept": true}), Duration::from_secs(600))
                .await
                .unwrap();
        }

        let reopened = SqliteStore::new(path_str).await.unwrap();
        assert_eq!(
            reopened.get_json("k").await.unwrap(),
            Some(json!({"kept": true}))
        );
    }
}
