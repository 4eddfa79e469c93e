//! In-Memory Store
//!
//! `ConfigStore` backed by a `HashMap`. Clones share the same data and change
//! channel, so two clones behave like two execution contexts attached to one
//! store. Data is lost when the process exits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use summarizer_prompts_core::{ConfigStore, CoreResult, StoreChange, CHANGE_CHANNEL_CAPACITY};
use tokio::sync::{broadcast, RwLock};

/// In-memory implementation of `ConfigStore` for development and testing.
#[derive(Clone)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, Value>>>,
    changes: broadcast::Sender<StoreChange>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            changes,
        }
    }

    /// Number of keys currently stored.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    /// Whether nothing has been written yet.
    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn get(&self, key: &str) -> CoreResult<Option<Value>> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> CoreResult<()> {
        let old_value = {
            let mut data = self.data.write().await;
            data.insert(key.to_string(), value.clone())
        };
        // No receivers is fine
        let _ = self
            .changes
            .send(StoreChange::new(key, old_value, Some(value)));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
