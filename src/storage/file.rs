//! JSON File Store
//!
//! `ConfigStore` that keeps the whole key-value map in one pretty-printed
//! JSON file. The file is read once at `open`; every write rewrites it
//! through a temporary file and a rename.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use summarizer_prompts_core::{
    ConfigStore, CoreError, CoreResult, StoreChange, CHANGE_CHANNEL_CAPACITY,
};
use tokio::sync::{broadcast, RwLock};

use crate::utils::error::AppResult;
use crate::utils::paths::{ensure_app_dir, store_path};

/// File-backed implementation of `ConfigStore`.
pub struct JsonFileStore {
    path: PathBuf,
    data: RwLock<Map<String, Value>>,
    changes: broadcast::Sender<StoreChange>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading existing contents if the file exists.
    pub async fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let data = if tokio::fs::try_exists(&path).await? {
            let content = tokio::fs::read_to_string(&path).await?;
            match serde_json::from_str::<Value>(&content)? {
                Value::Object(map) => map,
                _ => {
                    return Err(CoreError::storage(format!(
                        "Store file is not a JSON object: {}",
                        path.display()
                    )))
                }
            }
        } else {
            Map::new()
        };

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            path,
            data: RwLock::new(data),
            changes,
        })
    }

    /// Open the store at the platform default location.
    pub async fn open_default() -> AppResult<Self> {
        ensure_app_dir()?;
        let path = store_path()?;
        Ok(Self::open(path).await?)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_file(&self, data: &Map<String, Value>) -> CoreResult<()> {
        let content = serde_json::to_string_pretty(data)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for JsonFileStore {
    async fn get(&self, key: &str) -> CoreResult<Option<Value>> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> CoreResult<()> {
        let old_value = {
            let mut data = self.data.write().await;
            let mut next = data.clone();
            let old_value = next.insert(key.to_string(), value.clone());
            // Memory only changes once the file write succeeded
            self.write_file(&next).await.map_err(|e| {
                CoreError::storage(format!("Failed to write {}: {}", self.path.display(), e))
            })?;
            *data = next;
            old_value
        };
        let _ = self
            .changes
            .send(StoreChange::new(key, old_value, Some(value)));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
