//! Configuration Manager
//!
//! Owns the canonical configuration document. Every mutation goes through
//! [`ConfigManager::update_config`], which persists to the store before the
//! cache changes. Writes from other contexts sharing the store arrive on the
//! store's change channel and replace the cache without being written back.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde_json::Value;
use summarizer_prompts_core::{ConfigStore, StoreChange, CHANGE_CHANNEL_CAPACITY};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::models::config::{default_config, PromptConfig};
use crate::utils::error::{AppError, AppResult};

/// Store key of the configuration document.
pub const CONFIG_KEY: &str = "prompt_config";

type Listener = Arc<dyn Fn(&PromptConfig) + Send + Sync>;

struct ManagerInner {
    store: Arc<dyn ConfigStore>,
    /// `None` until initialized, and again after `dispose`
    state: RwLock<Option<PromptConfig>>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
    /// Serialized documents this manager wrote whose change event has not come back yet
    pending_echoes: Mutex<VecDeque<String>>,
    sync_task: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for ManagerInner {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.sync_task).take() {
            handle.abort();
        }
    }
}

/// Handle to a registered listener.
pub struct Subscription {
    id: u64,
    inner: Weak<ManagerInner>,
}

impl Subscription {
    /// Listener id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stop receiving notifications.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.inner.upgrade() {
            lock(&inner.listeners).retain(|(id, _)| *id != self.id);
        }
    }
}

/// Canonical configuration owner. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ConfigManager {
    inner: Arc<ManagerInner>,
}

impl ConfigManager {
    /// Create an uninitialized manager over `store`.
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                store,
                state: RwLock::new(None),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(1),
                pending_echoes: Mutex::new(VecDeque::new()),
                sync_task: Mutex::new(None),
            }),
        }
    }

    /// The store this manager persists to
    pub fn store(&self) -> Arc<dyn ConfigStore> {
        self.inner.store.clone()
    }

    /// Load the configuration once and start following external changes.
    ///
    /// Stored documents are normalized (and the normalized form written back).
    /// With nothing stored, the compiled-in defaults are seeded. If the store
    /// cannot be read, defaults are used without persisting anything.
    pub async fn initialize(&self) -> AppResult<PromptConfig> {
        let (config, receiver) = {
            let mut state = self.inner.state.write().await;
            if let Some(config) = state.as_ref() {
                return Ok(config.clone());
            }
            // Subscribe before reading so no external write slips between the two
            let receiver = self.inner.store.subscribe();
            let config = self.load_or_seed().await?;
            *state = Some(config.clone());
            (config, receiver)
        };
        self.start_sync(receiver);
        Ok(config)
    }

    async fn load_or_seed(&self) -> AppResult<PromptConfig> {
        match self.inner.store.get(CONFIG_KEY).await {
            Ok(Some(document)) => match serde_json::from_value::<PromptConfig>(document) {
                Ok(stored) => {
                    let config = stored.clone().normalized();
                    if !config.is_identical(&stored) {
                        if let Err(e) = self.persist(&config).await {
                            tracing::warn!(
                                "[ConfigManager] Failed to persist normalized configuration: {}",
                                e
                            );
                        }
                    }
                    tracing::info!("[ConfigManager] Loaded stored configuration");
                    Ok(config)
                }
                Err(e) => {
                    tracing::warn!(
                        "[ConfigManager] Stored configuration is unreadable, using defaults: {}",
                        e
                    );
                    Ok(default_config()?.normalized())
                }
            },
            Ok(None) => {
                let config = default_config()?.normalized();
                match self.persist(&config).await {
                    Ok(()) => tracing::info!("[ConfigManager] Seeded default configuration"),
                    Err(e) => tracing::warn!(
                        "[ConfigManager] Failed to seed default configuration: {}",
                        e
                    ),
                }
                Ok(config)
            }
            Err(e) => {
                tracing::warn!(
                    "[ConfigManager] Failed to read configuration, running on defaults: {}",
                    e
                );
                Ok(default_config()?.normalized())
            }
        }
    }

    fn start_sync(&self, mut receiver: broadcast::Receiver<StoreChange>) {
        let weak = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            loop {
                let change = match receiver.recv().await {
                    Ok(change) => Some(change),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "[ConfigManager] Missed {} store change events, resyncing",
                            skipped
                        );
                        None
                    }
                    Err(RecvError::Closed) => break,
                };
                let Some(inner) = weak.upgrade() else { break };
                let manager = ConfigManager { inner };
                match change {
                    Some(change) => {
                        manager.apply_external_change(change).await;
                    }
                    None => manager.resync().await,
                }
            }
        });

        if let Some(previous) = lock(&self.inner.sync_task).replace(handle) {
            previous.abort();
        }
    }

    async fn resync(&self) {
        lock(&self.inner.pending_echoes).clear();
        match self.inner.store.get(CONFIG_KEY).await {
            Ok(document) => {
                self.apply_external_change(StoreChange::new(CONFIG_KEY, None, document))
                    .await;
            }
            Err(e) => tracing::warn!("[ConfigManager] Resync read failed: {}", e),
        }
    }

    /// Apply a change event from the store. Returns whether the cache changed.
    ///
    /// Events for other keys, echoes of this manager's own writes and
    /// documents identical to the cache are ignored. Nothing is persisted.
    pub async fn apply_external_change(&self, change: StoreChange) -> bool {
        if change.key != CONFIG_KEY {
            return false;
        }
        let Some(document) = change.new_value else {
            return false;
        };
        if self.take_echo(&document) {
            tracing::debug!("[ConfigManager] Ignoring echo of own write");
            return false;
        }
        let incoming = match serde_json::from_value::<PromptConfig>(document) {
            Ok(config) => config.normalized(),
            Err(e) => {
                tracing::warn!("[ConfigManager] Ignoring undecodable external change: {}", e);
                return false;
            }
        };

        {
            let mut state = self.inner.state.write().await;
            match state.as_ref() {
                None => return false,
                Some(current) if current.is_identical(&incoming) => {
                    tracing::debug!("[ConfigManager] External change matches cache");
                    return false;
                }
                Some(_) => {}
            }
            *state = Some(incoming.clone());
        }

        tracing::debug!("[ConfigManager] Applied external configuration change");
        self.notify(&incoming);
        true
    }

    /// Current configuration, initializing first if needed.
    pub async fn get_config(&self) -> AppResult<PromptConfig> {
        self.initialize().await
    }

    /// One top-level section of the configuration, or an empty object.
    pub async fn get_config_section(&self, name: &str) -> AppResult<Value> {
        let config = self.get_config().await?;
        let document = serde_json::to_value(&config)?;
        Ok(document
            .get(name)
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new())))
    }

    /// Apply `transform` to a copy of the current configuration, persist the
    /// result and make it current.
    ///
    /// If `transform` fails, or persisting fails, nothing changes. A result
    /// identical to the current document is neither persisted nor announced.
    pub async fn update_config<F>(&self, transform: F) -> AppResult<PromptConfig>
    where
        F: FnOnce(PromptConfig) -> AppResult<PromptConfig>,
    {
        self.initialize().await?;
        let updated = {
            let mut state = self.inner.state.write().await;
            let current = state
                .as_ref()
                .cloned()
                .ok_or_else(|| AppError::internal("Configuration manager was disposed"))?;
            let next = transform(current.clone())?;
            if next.is_identical(&current) {
                return Ok(current);
            }
            self.persist(&next).await?;
            *state = Some(next.clone());
            next
        };
        tracing::debug!("[ConfigManager] Configuration updated");
        self.notify(&updated);
        Ok(updated)
    }

    /// Replace the configuration with the normalized compiled-in defaults.
    pub async fn reset_config(&self) -> AppResult<PromptConfig> {
        let config = default_config()?.normalized();
        let config = self.replace(config).await?;
        tracing::info!("[ConfigManager] Configuration reset to defaults");
        Ok(config)
    }

    /// Validate, normalize and adopt an externally supplied document.
    ///
    /// A document that fails validation leaves stored and cached state untouched.
    pub async fn import_config(&self, document: Value) -> AppResult<PromptConfig> {
        let config = PromptConfig::from_value(document)?.normalized();
        let config = self.replace(config).await?;
        tracing::info!("[ConfigManager] Imported configuration");
        Ok(config)
    }

    async fn replace(&self, config: PromptConfig) -> AppResult<PromptConfig> {
        self.initialize().await?;
        {
            let mut state = self.inner.state.write().await;
            self.persist(&config).await?;
            *state = Some(config.clone());
        }
        self.notify(&config);
        Ok(config)
    }

    /// Register a listener called with the new configuration after every
    /// successful update and every applied external change.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&PromptConfig) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        let listener: Listener = Arc::new(listener);
        lock(&self.inner.listeners).push((id, listener));
        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Number of registered listeners
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.listeners).len()
    }

    /// Whether a configuration is cached
    pub async fn is_initialized(&self) -> bool {
        self.inner.state.read().await.is_some()
    }

    /// Stop following the store, drop listeners and clear the cache.
    ///
    /// A later `initialize` reloads from the store.
    pub async fn dispose(&self) {
        if let Some(handle) = lock(&self.inner.sync_task).take() {
            handle.abort();
        }
        lock(&self.inner.listeners).clear();
        lock(&self.inner.pending_echoes).clear();
        *self.inner.state.write().await = None;
        tracing::debug!("[ConfigManager] Disposed");
    }

    async fn persist(&self, config: &PromptConfig) -> AppResult<()> {
        let document = serde_json::to_value(config)?;
        let fingerprint = document.to_string();
        {
            let mut pending = lock(&self.inner.pending_echoes);
            if pending.len() >= CHANGE_CHANNEL_CAPACITY {
                pending.pop_front();
            }
            pending.push_back(fingerprint.clone());
        }
        if let Err(e) = self.inner.store.set(CONFIG_KEY, document).await {
            let mut pending = lock(&self.inner.pending_echoes);
            if let Some(position) = pending.iter().rposition(|p| *p == fingerprint) {
                pending.remove(position);
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn take_echo(&self, document: &Value) -> bool {
        let mut pending = lock(&self.inner.pending_echoes);
        if pending.is_empty() {
            return false;
        }
        let fingerprint = document.to_string();
        match pending.iter().position(|p| *p == fingerprint) {
            Some(position) => {
                pending.remove(position);
                true
            }
            None => false,
        }
    }

    fn notify(&self, config: &PromptConfig) {
        let listeners: Vec<Listener> = lock(&self.inner.listeners)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(config);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
