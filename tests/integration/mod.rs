//! Integration Tests Module
//!
//! Exercises the public API end to end over the in-memory and file stores:
//! cross-context synchronization, template editing, prompt building, custom
//! prompt defaults and configuration export/import.

mod common;

// Configuration manager lifecycle and cross-context sync
mod config_manager_test;

// Parameter and template editing
mod template_service_test;

// Prompt assembly
mod prompt_builder_test;


// Export/import through files
mod settings_export_test;
