//! Token revocation store
//!
//! Tokens invalidated before their natural expiry (logout) are recorded here,
//! keyed by the raw token string, with a TTL equal to the token's remaining
//! lifetime so entries clean themselves up.
//!
//! A lookup miss is `Ok(None)`. Anything else that goes wrong is an `Err`, so
//! callers can tell "not revoked" apart from "store unreachable".

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

/// Revocation store errors
#[derive(Debug, Error)]
pub enum RevocationError {
    #[error("Revocation store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("Revocation store did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Revocation store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value capability used to record revoked tokens
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Store `value` under `key`, expiring after `ttl`
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), RevocationError>;

    /// Fetch the value under `key`; a miss is `Ok(None)`
    async fn get(&self, key: &str) -> Result<Option<String>, RevocationError>;

    /// Remove `key` if present
    async fn delete(&self, key: &str) -> Result<(), RevocationError>;
}

/// Redis-backed revocation store
///
/// Every command runs under a per-call timeout so a stalled Redis cannot hold
/// a request open indefinitely.
#[derive(Clone)]
pub struct RedisRevocationStore {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl RedisRevocationStore {
    /// Connect to Redis at `url`
    pub async fn connect(url: &str, op_timeout: Duration) -> Result<Self, RevocationError> {
        let client = redis::Client::open(url)?;
        let conn = tokio::time::timeout(op_timeout * 10, ConnectionManager::new(client))
            .await
            .map_err(|_| RevocationError::Timeout(op_timeout * 10))??;

        tracing::info!(url = %url, "Connected to revocation store");
        Ok(Self { conn, op_timeout })
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, RevocationError>
    where
        F: std::future::Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::error!(op, error = %e, "Revocation store command failed");
                Err(RevocationError::Store(e))
            }
            Err(_) => {
                tracing::error!(op, timeout_ms = self.op_timeout.as_millis() as u64, "Revocation store command timed out");
                Err(RevocationError::Timeout(self.op_timeout))
            }
        }
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), RevocationError> {
        let mut conn = self.conn.clone();
        // SETEX rejects a zero expiry
        let secs = ttl.as_secs().max(1);
        self.bounded("set", async move { conn.set_ex::<_, _, ()>(key, value, secs).await })
            .await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, RevocationError> {
        let mut conn = self.conn.clone();
        self.bounded("get", async move { conn.get::<_, Option<String>>(key).await })
            .await
    }

    async fn delete(&self, key: &str) -> Result<(), RevocationError> {
        let mut conn = self.conn.clone();
        self.bounded("del", async move { conn.del::<_, ()>(key).await })
            .await
    }
}

/// In-process revocation store
///
/// Honours TTLs on read. Suitable for tests and single-instance development
/// runs; it can be switched into a failing mode to simulate a store outage,
/// and counts calls so tests can assert that no store I/O happened.
#[derive(Default)]
pub struct MemoryRevocationStore {
    entries: RwLock<HashMap<String, (String, Instant)>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of store operations attempted so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<(), RevocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RevocationError::Unavailable(
                "memory store set to failing".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), RevocationError> {
        self.enter()?;
        let expires_at = Instant::now() + ttl;
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, RevocationError> {
        self.enter()?;
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > now => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), RevocationError> {
        self.enter()?;
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_miss_is_none() {
        let store = MemoryRevocationStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryRevocationStore::new();

        store
            .put("token-a", "revoked", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("token-a").await.unwrap().as_deref(), Some("revoked"));
        assert_eq!(store.get("token-b").await.unwrap(), None);

        store.delete("token-a").await.unwrap();
        assert_eq!(store.get("token-a").await.unwrap(), None);
        assert_eq!(store.call_count(), 5);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let store = MemoryRevocationStore::new();
        store
            .put("short", "revoked", Duration::from_millis(20))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(store.get("short").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failing_mode_is_an_error_not_a_miss() {
        let store = MemoryRevocationStore::new();
        store.set_failing(true);

        assert!(matches!(
            store.get("anything").await,
            Err(RevocationError::Unavailable(_))
        ));

        store.set_failing(false);
        assert!(store.get("anything").await.is_ok());
    }
}
