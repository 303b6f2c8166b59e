//! In-memory flow store, used when Redis is not configured.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use lectern_core::ports::{FlowStore, FlowStoreError};

struct Entry {
    value: String,
    expires_at: Instant,
}

/// Per-process flow state. Lost on restart, not shared between instances.
pub struct InMemoryFlowStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryFlowStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Drop every expired entry. Called on writes so abandoned flows do not pile up.
    fn sweep(entries: &mut HashMap<String, Entry>, now: Instant) {
        entries.retain(|_, entry| entry.expires_at > now);
    }
}

impl Default for InMemoryFlowStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FlowStore for InMemoryFlowStore {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.expires_at <= Instant::now() {
            return None;
        }
        Some(entry.value.clone())
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), FlowStoreError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        Self::sweep(&mut entries, now);
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), FlowStoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_core::domain::PasswordReset;
    use lectern_core::ports::flow_store;

    #[tokio::test]
    async fn test_put_and_get() {
        let store = InMemoryFlowStore::new();
        store.put("k", "v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k").await, Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_expired_entry_is_gone() {
        let store = InMemoryFlowStore::new();
        store.put("k", "v", Duration::from_millis(10)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.get("k").await, None);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = InMemoryFlowStore::new();
        store.put("k", "v", Duration::from_secs(60)).await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await, None);
    }

    #[tokio::test]
    async fn test_typed_helpers() {
        let store = InMemoryFlowStore::new();
        let flow = PasswordReset::default();
        flow_store::save(&store, "reset:1", &flow, Duration::from_secs(60))
            .await
            .unwrap();

        let loaded: Option<PasswordReset> = flow_store::load(&store, "reset:1").await;
        assert_eq!(loaded.unwrap().stage(), flow.stage());

        store.put("reset:2", "not json", Duration::from_secs(60)).await.unwrap();
        let broken: Option<PasswordReset> = flow_store::load(&store, "reset:2").await;
        assert!(broken.is_none());
    }
}
