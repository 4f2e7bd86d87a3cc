//! Shared failure accumulator
//!
//! The one mutable structure shared across concurrent producers (modules
//! and their signal tasks) and the single consumer (the engine at verdict
//! time). Producers only append; the consumer snapshots after every
//! producer has joined.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Default)]
pub struct FailureLog {
    entries: Arc<Mutex<HashMap<String, Vec<String>>>>,
}

impl FailureLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failure message for a module. Messages are stored as
    /// `"<module>: <message>"` in insertion order.
    pub async fn append(&self, module: &str, message: &str) {
        let rendered = format!("{module}: {message}");
        let mut entries = self.entries.lock().await;
        entries
            .entry(module.to_string())
            .or_default()
            .push(rendered);
    }

    /// Copy of the current failure map.
    pub async fn snapshot(&self) -> HashMap<String, Vec<String>> {
        self.entries.lock().await.clone()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
