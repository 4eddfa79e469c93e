//! Custom Prompt Models
//!
//! User-authored prompts bound to one content type. Stored bucketed by
//! content type, with at most one default per type.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A complete user-authored prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomPrompt {
    pub id: String,
    pub name: String,
    /// Raw prompt text (not templated)
    pub content: String,
    pub content_type: String,
    /// RFC 3339 timestamps
    pub created_at: String,
    pub updated_at: String,
}

/// Request to create a custom prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomPromptCreateRequest {
    pub name: String,
    pub content: String,
    pub content_type: String,
}

/// Request to update a custom prompt; `content_type` relocates it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomPromptUpdateRequest {
    pub name: Option<String>,
    pub content: Option<String>,
    pub content_type: Option<String>,
}

/// Prompts keyed by content type, then by prompt id
pub type PromptBuckets = IndexMap<String, IndexMap<String, CustomPrompt>>;

/// Default prompt id keyed by content type
pub type DefaultPromptIds = IndexMap<String, String>;
