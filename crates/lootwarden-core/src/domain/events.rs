//! Events - エンジンが発行するドメインイベント
//!
//! Serialized with a `type` tag in SCREAMING_SNAKE_CASE
//! (`ITEM_LOOTED`, `NO_DROP_WAIT_EXPIRED`, ...).

use serde::{Deserialize, Serialize};

use super::action::LootAction;
use super::ids::SessionId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LootEvent {
    ItemLooted {
        item: String,
        value: u64,
    },
    ItemDestroyed {
        item: String,
        value: u64,
    },
    ItemPassed {
        item: String,
        player: String,
        value: u64,
    },
    ItemLeft {
        item: String,
        value: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    NoDropWaitStart {
        item: String,
        wait_secs: u64,
        reason: String,
    },
    NoDropWaitExpired {
        item: String,
        reason: String,
    },
    DecisionDeferred {
        item: String,
    },
    CommandTimedOut {
        item: String,
        action: LootAction,
    },
    SessionOpened {
        session: SessionId,
        target: String,
    },
    SessionClosed {
        session: SessionId,
        reason: String,
    },
}

impl LootEvent {
    /// Event for an action the external actor confirmed.
    ///
    /// Returns `None` for actions that never produce a command.
    pub fn completed(item: &str, action: &LootAction, value: u64) -> Option<Self> {
        let item = item.to_string();
        match action {
            LootAction::Keep | LootAction::Sell => Some(LootEvent::ItemLooted { item, value }),
            LootAction::Destroy => Some(LootEvent::ItemDestroyed { item, value }),
            LootAction::Pass(player) => Some(LootEvent::ItemPassed {
                item,
                player: player.clone(),
                value,
            }),
            LootAction::Ignore | LootAction::Leave => Some(LootEvent::ItemLeft {
                item,
                value,
                reason: None,
            }),
            LootAction::Ask => None,
        }
    }

    /// Event name as carried on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            LootEvent::ItemLooted { .. } => "ITEM_LOOTED",
            LootEvent::ItemDestroyed { .. } => "ITEM_DESTROYED",
            LootEvent::ItemPassed { .. } => "ITEM_PASSED",
            LootEvent::ItemLeft { .. } => "ITEM_LEFT",
            LootEvent::NoDropWaitStart { .. } => "NO_DROP_WAIT_START",
            LootEvent::NoDropWaitExpired { .. } => "NO_DROP_WAIT_EXPIRED",
            LootEvent::DecisionDeferred { .. } => "DECISION_DEFERRED",
            LootEvent::CommandTimedOut { .. } => "COMMAND_TIMED_OUT",
            LootEvent::SessionOpened { .. } => "SESSION_OPENED",
            LootEvent::SessionClosed { .. } => "SESSION_CLOSED",
        }
    }
}
