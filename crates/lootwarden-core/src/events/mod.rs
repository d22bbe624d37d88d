//! Event fan-out with per-handler isolation.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{LootError, LootEvent, Result};

/// A subscriber to engine events.
#[async_trait]
pub trait LootEventHandler: Send + Sync {
    async fn handle(&self, event: &LootEvent) -> Result<()>;
}

/// Registry of named handlers.
///
/// Design:
/// - Built during initialization (mutable).
/// - Used during runtime (immutable), so publishing needs no lock.
///
/// Each handler runs in its own task. A handler that errors or panics is
/// logged and counted; the remaining handlers still receive the event and
/// the engine carries on.
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<(String, Arc<dyn LootEventHandler>)>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub failed: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn LootEventHandler>,
    ) -> Result<()> {
        let name = name.into();
        if self.handlers.iter().any(|(n, _)| *n == name) {
            return Err(LootError::DuplicateHandler(name));
        }
        self.handlers.push((name, handler));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub async fn publish(&self, event: LootEvent) -> PublishReport {
        let mut report = PublishReport::default();
        for (name, handler) in &self.handlers {
            let handler = Arc::clone(handler);
            let event = event.clone();
            let joined = tokio::spawn(async move { handler.handle(&event).await }).await;

            match joined {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    report.failed += 1;
                    tracing::warn!(handler = %name, error = %e, "event handler failed");
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(handler = %name, error = %e, "event handler panicked");
                }
            }
        }
        report
    }
}
