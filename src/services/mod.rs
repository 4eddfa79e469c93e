//! Services
//!
//! Business logic over the configuration store. Every service is built from
//! an explicit `ConfigManager` or store handle; nothing is global.

pub mod config_manager;
pub mod custom_prompt;
pub mod preferences;
pub mod prompt_builder;
pub mod settings_export;
pub mod template;

pub use config_manager::{ConfigManager, Subscription, CONFIG_KEY};
pub use custom_prompt::CustomPromptService;
pub use preferences::PreferenceService;
pub use prompt_builder::PromptBuilder;
pub use template::{NewParameter, ScopedParameter, TemplateService};
