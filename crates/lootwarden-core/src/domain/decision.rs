//! Decision model: the resolved action for an item and where it came from.

use serde::{Deserialize, Serialize};

use super::action::LootAction;
use super::filter::FilterKind;

/// Which phase of the cascade produced a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "detail", rename_all = "snake_case")]
pub enum DecisionOrigin {
    /// Phase 1: an active loot filter.
    Filter(FilterKind),
    /// Phase 2: a persisted rule.
    Rule,
    /// Phase 3: the default heuristic (a rule was written as a side effect).
    Heuristic,
    /// No-drop item with nothing telling us to keep or pass it.
    /// The item is left alone while its grace period runs.
    NoDropWait { reason: String },
}

/// The outcome of running the cascade for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub action: LootAction,
    pub origin: DecisionOrigin,
}

impl Decision {
    pub fn new(action: LootAction, origin: DecisionOrigin) -> Self {
        Self { action, origin }
    }

    pub fn wait(reason: impl Into<String>) -> Self {
        Self {
            action: LootAction::Leave,
            origin: DecisionOrigin::NoDropWait {
                reason: reason.into(),
            },
        }
    }

    /// Is this the no-drop grace path (no command, not yet processed)?
    pub fn is_waiting(&self) -> bool {
        matches!(self.origin, DecisionOrigin::NoDropWait { .. })
    }

    pub fn wait_reason(&self) -> Option<&str> {
        match &self.origin {
            DecisionOrigin::NoDropWait { reason } => Some(reason),
            _ => None,
        }
    }
}
