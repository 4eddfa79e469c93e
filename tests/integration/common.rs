//! Shared helpers for the integration tests.

use std::time::Duration;

use serde_json::{json, Value};

/// Poll `check` until it returns true or a second has passed.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// Smallest valid configuration with a single `tone` shared parameter.
pub fn tone_document() -> Value {
    json!({
        "sharedParameters": {
            "tone": {
                "param_name": "Tone",
                "type": "list",
                "values": {"neutral": "Be neutral.", "casual": "Be casual."},
                "order": 0
            }
        },
        "defaultPrompts": {
            "general": {"name": "General", "baseTemplate": "Analyze this.", "parameters": {}},
            "reddit": {"name": "Reddit", "baseTemplate": "Analyze this thread.", "parameters": {}},
            "youtube": {"name": "YouTube", "baseTemplate": "Analyze this video.", "parameters": {}}
        }
    })
}
