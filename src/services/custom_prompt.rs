//! Custom Prompt Service
//!
//! User-authored prompts, bucketed by content type in the store, plus the
//! per-type default prompt bookkeeping. After every structural change the
//! defaults are reconciled so that each content type with prompts has
//! exactly one valid default.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use summarizer_prompts_core::ConfigStore;
use uuid::Uuid;

use crate::models::custom_prompt::{
    CustomPrompt, CustomPromptCreateRequest, CustomPromptUpdateRequest, DefaultPromptIds,
    PromptBuckets,
};
use crate::utils::error::{AppError, AppResult};

/// Store key of the prompt buckets.
pub const CUSTOM_PROMPTS_KEY: &str = "custom_prompts";
/// Store key of the default prompt ids.
pub const DEFAULT_PROMPT_IDS_KEY: &str = "default_prompt_ids";

/// Service for managing custom prompts
#[derive(Clone)]
pub struct CustomPromptService {
    store: Arc<dyn ConfigStore>,
}

impl CustomPromptService {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// All prompts, bucketed by content type
    pub async fn list_all(&self) -> AppResult<PromptBuckets> {
        self.load(CUSTOM_PROMPTS_KEY).await
    }

    /// Prompts of one content type, oldest first
    pub async fn list_prompts(&self, content_type: &str) -> AppResult<Vec<CustomPrompt>> {
        let buckets = self.list_all().await?;
        Ok(buckets
            .get(content_type)
            .map(|bucket| bucket.values().cloned().collect())
            .unwrap_or_default())
    }

    /// Look up a prompt by id across all content types
    pub async fn get_prompt(&self, id: &str) -> AppResult<Option<CustomPrompt>> {
        let buckets = self.list_all().await?;
        Ok(find_prompt(&buckets, id).map(|(_, prompt)| prompt.clone()))
    }

    /// Default prompt ids keyed by content type
    pub async fn default_prompt_ids(&self) -> AppResult<DefaultPromptIds> {
        self.load(DEFAULT_PROMPT_IDS_KEY).await
    }

    /// The default prompt of a content type, if one is set
    pub async fn get_default_prompt(&self, content_type: &str) -> AppResult<Option<CustomPrompt>> {
        let defaults = self.default_prompt_ids().await?;
        let Some(id) = defaults.get(content_type) else {
            return Ok(None);
        };
        let buckets = self.list_all().await?;
        Ok(buckets
            .get(content_type)
            .and_then(|bucket| bucket.get(id))
            .cloned())
    }

    /// Create a prompt
    pub async fn create_prompt(&self, req: CustomPromptCreateRequest) -> AppResult<CustomPrompt> {
        if req.name.trim().is_empty() {
            return Err(AppError::validation("Prompt name must not be empty"));
        }
        if req.content_type.trim().is_empty() {
            return Err(AppError::validation("Prompt content type must not be empty"));
        }

        let now = timestamp();
        let prompt = CustomPrompt {
            id: format!("prompt_{}", Uuid::new_v4()),
            name: req.name,
            content: req.content,
            content_type: req.content_type,
            created_at: now.clone(),
            updated_at: now,
        };

        let mut buckets = self.list_all().await?;
        buckets
            .entry(prompt.content_type.clone())
            .or_default()
            .insert(prompt.id.clone(), prompt.clone());
        self.save(CUSTOM_PROMPTS_KEY, &buckets).await?;
        self.ensure_default_prompts().await?;

        tracing::debug!("[CustomPrompts] Created prompt {}", prompt.id);
        Ok(prompt)
    }

    /// Update name/content, or move the prompt to another content type.
    ///
    /// Moving the only prompt of a content type while it is that type's
    /// default is refused.
    pub async fn update_prompt(
        &self,
        id: &str,
        req: CustomPromptUpdateRequest,
    ) -> AppResult<CustomPrompt> {
        let mut buckets = self.list_all().await?;
        let (origin, mut prompt) = find_prompt(&buckets, id)
            .map(|(content_type, prompt)| (content_type.to_string(), prompt.clone()))
            .ok_or_else(|| AppError::not_found(format!("Prompt not found: {}", id)))?;

        let destination = req
            .content_type
            .filter(|content_type| *content_type != origin);

        if let Some(ref destination) = destination {
            if destination.trim().is_empty() {
                return Err(AppError::validation("Prompt content type must not be empty"));
            }
            let defaults = self.default_prompt_ids().await?;
            if is_sole_default(&buckets, &defaults, &origin, id) {
                return Err(AppError::invariant(format!(
                    "Cannot move the only prompt of '{}' while it is the default; create another prompt first",
                    origin
                )));
            }
        }

        if let Some(name) = req.name {
            if name.trim().is_empty() {
                return Err(AppError::validation("Prompt name must not be empty"));
            }
            prompt.name = name;
        }
        if let Some(content) = req.content {
            prompt.content = content;
        }
        prompt.updated_at = timestamp();

        match destination {
            Some(destination) => {
                remove_from_bucket(&mut buckets, &origin, id);
                prompt.content_type = destination.clone();
                buckets
                    .entry(destination)
                    .or_default()
                    .insert(prompt.id.clone(), prompt.clone());
            }
            None => {
                if let Some(slot) = buckets.get_mut(&origin).and_then(|b| b.get_mut(id)) {
                    *slot = prompt.clone();
                }
            }
        }

        self.save(CUSTOM_PROMPTS_KEY, &buckets).await?;
        self.ensure_default_prompts().await?;
        Ok(prompt)
    }

    /// Delete a prompt. The only prompt of a content type cannot be deleted
    /// while it is the default.
    pub async fn delete_prompt(&self, id: &str) -> AppResult<()> {
        let mut buckets = self.list_all().await?;
        let origin = find_prompt(&buckets, id)
            .map(|(content_type, _)| content_type.to_string())
            .ok_or_else(|| AppError::not_found(format!("Prompt not found: {}", id)))?;

        let defaults = self.default_prompt_ids().await?;
        if is_sole_default(&buckets, &defaults, &origin, id) {
            return Err(AppError::invariant(format!(
                "Cannot delete the only prompt of '{}' while it is the default; create another prompt first",
                origin
            )));
        }

        remove_from_bucket(&mut buckets, &origin, id);
        self.save(CUSTOM_PROMPTS_KEY, &buckets).await?;
        self.ensure_default_prompts().await?;

        tracing::debug!("[CustomPrompts] Deleted prompt {}", id);
        Ok(())
    }

    /// Mark `id` as the default prompt of `content_type`.
    pub async fn set_default_prompt(&self, content_type: &str, id: &str) -> AppResult<()> {
        let buckets = self.list_all().await?;
        if !buckets
            .get(content_type)
            .is_some_and(|bucket| bucket.contains_key(id))
        {
            return Err(AppError::not_found(format!(
                "Prompt {} not found for content type {}",
                id, content_type
            )));
        }
        let mut defaults = self.default_prompt_ids().await?;
        defaults.insert(content_type.to_string(), id.to_string());
        self.save(DEFAULT_PROMPT_IDS_KEY, &defaults).await
    }

    /// Give every content type with prompts a valid default and drop
    /// defaults recorded for content types without prompts.
    pub async fn ensure_default_prompts(&self) -> AppResult<DefaultPromptIds> {
        let buckets = self.list_all().await?;
        let defaults = self.default_prompt_ids().await?;
        let reconciled = reconcile_default_ids(&buckets, &defaults);
        if reconciled != defaults {
            for (content_type, id) in &reconciled {
                if defaults.get(content_type) != Some(id) {
                    tracing::debug!(
                        "[CustomPrompts] Default prompt for {} is now {}",
                        content_type,
                        id
                    );
                }
            }
            self.save(DEFAULT_PROMPT_IDS_KEY, &reconciled).await?;
        }
        Ok(reconciled)
    }

    async fn load<T: DeserializeOwned + Default>(&self, key: &str) -> AppResult<T> {
        match self.store.get(key).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(T::default()),
        }
    }

    async fn save<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        let value = serde_json::to_value(value)?;
        self.store.set(key, value).await?;
        Ok(())
    }
}

/// Keep valid defaults, pick the most recently updated prompt where the
/// default is missing or stale, and drop defaults of empty content types.
pub fn reconcile_default_ids(
    buckets: &PromptBuckets,
    defaults: &DefaultPromptIds,
) -> DefaultPromptIds {
    let mut reconciled = IndexMap::new();
    for (content_type, bucket) in buckets {
        let current = defaults
            .get(content_type)
            .filter(|id| bucket.contains_key(id.as_str()));
        let chosen = match current {
            Some(id) => Some(id.clone()),
            None => bucket
                .values()
                .max_by(|a, b| {
                    a.updated_at
                        .cmp(&b.updated_at)
                        .then_with(|| a.id.cmp(&b.id))
                })
                .map(|prompt| prompt.id.clone()),
        };
        if let Some(id) = chosen {
            reconciled.insert(content_type.clone(), id);
        }
    }
    reconciled
}

fn find_prompt<'a>(buckets: &'a PromptBuckets, id: &str) -> Option<(&'a str, &'a CustomPrompt)> {
    buckets.iter().find_map(|(content_type, bucket)| {
        bucket
            .get(id)
            .map(|prompt| (content_type.as_str(), prompt))
    })
}

fn is_sole_default(
    buckets: &PromptBuckets,
    defaults: &DefaultPromptIds,
    content_type: &str,
    id: &str,
) -> bool {
    let sole = buckets
        .get(content_type)
        .is_some_and(|bucket| bucket.len() == 1 && bucket.contains_key(id));
    sole && defaults.get(content_type).map(String::as_str) == Some(id)
}

fn remove_from_bucket(buckets: &mut PromptBuckets, content_type: &str, id: &str) {
    if let Some(bucket) = buckets.get_mut(content_type) {
        bucket.shift_remove(id);
        if bucket.is_empty() {
            buckets.shift_remove(content_type);
        }
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
