//! Event handlers: an in-memory recorder and a tracing logger.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{LootEvent, Result};
use crate::events::LootEventHandler;

/// Keeps every event it receives, in order.
#[derive(Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<LootEvent>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<LootEvent> {
        self.events.lock().await.clone()
    }

    /// Event names only, handy for sequence assertions.
    pub async fn names(&self) -> Vec<&'static str> {
        self.events.lock().await.iter().map(LootEvent::name).collect()
    }
}

#[async_trait]
impl LootEventHandler for RecordingHandler {
    async fn handle(&self, event: &LootEvent) -> Result<()> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

/// Writes each event as a structured `info` line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventHandler;

#[async_trait]
impl LootEventHandler for TracingEventHandler {
    async fn handle(&self, event: &LootEvent) -> Result<()> {
        let payload = serde_json::to_string(event)?;
        tracing::info!(target: "lootwarden::events", event = event.name(), %payload);
        Ok(())
    }
}
