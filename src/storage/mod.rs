//! Storage Layer
//!
//! `ConfigStore` implementations: an in-memory store shared between handles
//! and a JSON file store.

pub mod file;
pub mod memory;

pub use file::*;
pub use memory::*;

pub use summarizer_prompts_core::{ConfigStore, StoreChange};
