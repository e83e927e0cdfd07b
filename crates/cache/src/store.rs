//! Cache store contract and its Redis / in-memory implementations.
//!
//! Keys are plain namespaced strings; callers own the namespace
//! (`chassis-session:<id>`, `chassis-cache:<user>:<uri>`). Expiry is
//! handled by the backend: Redis via `SETEX`, the memory store via
//! per-key deadlines.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::CacheError;

/// Connection attempts before giving up on the Redis backend at startup.
const CONNECT_ATTEMPTS: u32 = 30;

/// Fixed backoff between connection attempts.
const CONNECT_BACKOFF: Duration = Duration::from_secs(1);

/// Key-value store with per-key expiry.
///
/// Every value is an opaque string; serialization is the caller's concern.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Fetch a value. Expired or missing keys return `None`.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value with a TTL in seconds, replacing any existing value
    /// and resetting its expiry.
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn del(&self, key: &str) -> Result<(), CacheError>;

    /// Liveness probe for health checks.
    async fn ping(&self) -> Result<(), CacheError>;
}

/// Redis-backed cache over a multiplexed async connection.
#[derive(Clone)]
pub struct RedisCache {
    conn: redis::aio::MultiplexedConnection,
}

impl RedisCache {
    /// Connect to Redis, waiting for the server to become ready.
    ///
    /// Retries a fixed number of times with a fixed backoff; a server that
    /// never becomes ready fails startup instead of hanging forever.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;

        let mut attempts_left = CONNECT_ATTEMPTS;
        loop {
            match client.get_multiplexed_async_connection().await {
                Ok(conn) => return Ok(Self { conn }),
                Err(err) => {
                    attempts_left -= 1;
                    if attempts_left == 0 {
                        return Err(CacheError::NotReady(format!(
                            "Redis at {url} did not become ready after {CONNECT_ATTEMPTS} attempts: {err}"
                        )));
                    }
                    tracing::warn!(error = %err, attempts_left, "Redis not ready, retrying");
                    tokio::time::sleep(CONNECT_BACKOFF).await;
                }
            }
        }
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }
}

/// In-memory cache for tests and local development.
///
/// Expiry uses `tokio::time::Instant` deadlines, so tests running under a
/// paused runtime clock can advance time deterministically. Expired entries
/// are treated as absent on read and dropped on the next write to the key.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|(_, deadline)| *deadline > Instant::now())
            .map(|(value, _)| value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
        let deadline = Instant::now() + Duration::from_secs(ttl_seconds);
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}
