//! Queued actions and execution results.

use serde::{Deserialize, Serialize};

use crate::domain::{CommandId, LootAction, LootItem};

/// A resolved action waiting for its turn at the command channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    pub slot: u32,
    pub shared: bool,
    pub item_name: String,
    pub action: LootAction,
    pub value: u64,
}

impl PendingAction {
    pub fn new(item: &LootItem, action: LootAction) -> Self {
        Self {
            slot: item.slot,
            shared: item.is_shared,
            item_name: item.name.clone(),
            action,
            value: item.value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum ExecOutcome {
    /// The actor confirmed the command.
    Confirmed,
    /// Dry-run mode: recorded as completed, nothing was sent.
    DryRun,
    /// No confirmation within the timeout; the lock was force-released.
    TimedOut,
    /// The session was cleared while the command was in flight.
    Cancelled,
    DispatchFailed(String),
    /// The action has no command (ASK).
    NoCommand,
}

impl ExecOutcome {
    /// Should the item count as processed?
    pub fn is_success(&self) -> bool {
        matches!(self, ExecOutcome::Confirmed | ExecOutcome::DryRun)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub command_id: CommandId,
    pub pending: PendingAction,
    pub outcome: ExecOutcome,
}
