//! Flow store port: short-lived per-browser state of multi-step forms.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Key/value store with expiry (in-memory or Redis).
#[async_trait]
pub trait FlowStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), FlowStoreError>;

    async fn remove(&self, key: &str) -> Result<(), FlowStoreError>;
}

/// Typed helpers over the raw string store.
pub async fn load<T: DeserializeOwned>(store: &dyn FlowStore, key: &str) -> Option<T> {
    let raw = store.get(key).await?;
    // A value written by an older layout is treated as absent.
    serde_json::from_str(&raw).ok()
}

pub async fn save<T: Serialize + Sync>(
    store: &dyn FlowStore,
    key: &str,
    value: &T,
    ttl: Duration,
) -> Result<(), FlowStoreError> {
    let raw =
        serde_json::to_string(value).map_err(|e| FlowStoreError::Serialization(e.to_string()))?;
    store.put(key, &raw, ttl).await
}

#[derive(Debug, thiserror::Error)]
pub enum FlowStoreError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}
