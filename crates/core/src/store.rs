//! Key-Value Store Contract
//!
//! The configuration services never talk to a concrete storage substrate.
//! They depend on `ConfigStore`: an async key-value store whose writes, from
//! any context sharing it, are announced on a broadcast channel.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::CoreResult;

/// Buffer size for store change channels.
pub const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A write observed on the store.
///
/// Emitted for every write, including writes made by the subscriber itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreChange {
    /// Key that was written.
    pub key: String,
    /// Value before the write, if the key existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    /// Value after the write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

impl StoreChange {
    /// Create a change event for `key`.
    pub fn new(key: impl Into<String>, old_value: Option<Value>, new_value: Option<Value>) -> Self {
        Self {
            key: key.into(),
            old_value,
            new_value,
        }
    }
}

/// Durable key-value store with change notification.
///
/// Implementations must be thread-safe (Send + Sync). Timeouts, retries and
/// durability are the implementation's concern.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if it was never written.
    async fn get(&self, key: &str) -> CoreResult<Option<Value>>;

    /// Write `value` under `key`, then announce the change to subscribers.
    async fn set(&self, key: &str, value: Value) -> CoreResult<()>;

    /// Subscribe to change events for writes from any context sharing the store.
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}
