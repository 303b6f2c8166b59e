//! Redis flow store, shared by every gateway instance.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use lectern_core::ports::{FlowStore, FlowStoreError};

#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    pub connect_timeout: Duration,
    /// Prefix for every key, so the gateway can share a Redis with other services.
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            key_prefix: "lectern:".to_string(),
        }
    }
}

impl RedisConfig {
    /// `None` when `REDIS_URL` is unset.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("REDIS_URL").ok()?;
        Some(Self {
            url,
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            key_prefix: std::env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| "lectern:".to_string()),
        })
    }
}

pub struct RedisFlowStore {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisFlowStore {
    pub async fn new(config: RedisConfig) -> Result<Self, FlowStoreError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| FlowStoreError::Connection(e.to_string()))?;

        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| FlowStoreError::Connection("Connection timed out".to_string()))?
            .map_err(|e| FlowStoreError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, "Connected to Redis flow store");

        Ok(Self {
            conn,
            key_prefix: config.key_prefix,
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl FlowStore for RedisFlowStore {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(self.key(key)).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Redis GET failed");
                None
            }
        }
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), FlowStoreError> {
        let mut conn = self.conn.clone();
        // SETEX rejects 0; sub-second TTLs round up.
        let secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(self.key(key), value, secs)
            .await
            .map_err(|e| FlowStoreError::Operation(e.to_string()))
    }

    async fn remove(&self, key: &str) -> Result<(), FlowStoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.key(key))
            .await
            .map_err(|e| FlowStoreError::Operation(e.to_string()))
    }
}
