//! Redis-backed cache for daily records.
//!
//! The store is the front for the scrape pipeline: records live under fixed
//! keys with a 24-hour expiry. A failed cache operation is a hard failure
//! for the request rather than a silent bypass, so an outage is visible
//! instead of turning every request into a scrape.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use thiserror::Error;
use tracing::info;

use crate::config::CacheSettings;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store unavailable: {0}")]
    Unavailable(#[from] redis::RedisError),
}

/// Key-value store with per-key expiry.
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError>;
}

/// Cache backed by a shared Redis connection manager.
///
/// The manager multiplexes one connection and reconnects on failure; it is
/// cheap to clone per operation.
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(settings: &CacheSettings) -> Result<Self, CacheError> {
        let client = redis::Client::open(settings.connection_info())?;
        let conn = ConnectionManager::new(client).await?;
        info!("Connected to cache at {}:{}", settings.host, settings.port);
        Ok(Self { conn })
    }
}

#[async_trait]
impl KeyValueCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
        Ok(())
    }
}
