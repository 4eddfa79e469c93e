//! Summarizer Prompts Core
//!
//! Storage contract and error types for the Summarizer Prompts workspace.
//! This crate has no dependency on the configuration model or the services
//! built on top of it.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `store` - Key-value store contract (`ConfigStore`, `StoreChange`)
//!
//! ## Design Principles
//!
//! 1. **Zero external dependencies beyond serde/async-trait/thiserror/tokio-sync**
//! 2. **Trait-based abstractions** - any durable key-value substrate can back the services
//! 3. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod error;
pub mod store;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Store Contract ─────────────────────────────────────────────────────
pub use store::{ConfigStore, StoreChange, CHANGE_CHANNEL_CAPACITY};
