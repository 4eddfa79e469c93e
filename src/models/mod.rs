//! Data Models
//!
//! Configuration document, validation, preferences and custom prompts.

pub mod config;
pub mod content_type;
pub mod custom_prompt;
pub mod preferences;
pub mod validation;

pub use config::*;
pub use content_type::Scope;
pub use custom_prompt::*;
pub use preferences::*;
pub use validation::validate_config;
