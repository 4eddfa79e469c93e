//! Summarizer Prompts
//!
//! Prompt configuration engine for a content summarizer. It includes:
//! - The configuration model, validation and normalization
//! - A configuration manager that keeps execution contexts in sync through a shared store
//! - Template editing, prompt assembly, custom prompts and saved preferences
//! - Store adapters (in-memory and JSON file)

pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use models::{
    default_config, validate_config, CustomPrompt, Parameter, ParameterKind, PreferenceValue,
    Preferences, PromptConfig, Scope, Template,
};
pub use services::{
    ConfigManager, CustomPromptService, PreferenceService, PromptBuilder, Subscription,
    TemplateService,
};
pub use state::AppState;
pub use storage::{ConfigStore, JsonFileStore, MemoryStore, StoreChange};
pub use utils::error::{AppError, AppResult};
