//! Actions: what the engine decides, and the primitive command it turns into.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical decision for one item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "player", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LootAction {
    Keep,
    /// Loot it for sale. Same command as `Keep`.
    Sell,
    /// Do not take it; the item is left on the source.
    Ignore,
    Destroy,
    Pass(String),
    /// Leave the item, e.g. an exhausted waterfall or an abandoned no-drop item.
    Leave,
    /// Defer to the operator.
    Ask,
}

impl LootAction {
    /// The primitive command for this action, or `None` when nothing is sent.
    pub fn command_kind(&self) -> Option<CommandKind> {
        match self {
            LootAction::Keep | LootAction::Sell => Some(CommandKind::Keep),
            LootAction::Ignore | LootAction::Leave => Some(CommandKind::Leave),
            LootAction::Destroy => Some(CommandKind::Destroy),
            LootAction::Pass(player) => Some(CommandKind::Pass(player.clone())),
            LootAction::Ask => None,
        }
    }

    /// Does this action put the item into our inventory?
    pub fn takes_item(&self) -> bool {
        matches!(self, LootAction::Keep | LootAction::Sell)
    }
}

impl fmt::Display for LootAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LootAction::Keep => write!(f, "KEEP"),
            LootAction::Sell => write!(f, "SELL"),
            LootAction::Ignore => write!(f, "IGNORE"),
            LootAction::Destroy => write!(f, "DESTROY"),
            LootAction::Pass(player) => write!(f, "PASS({player})"),
            LootAction::Leave => write!(f, "LEAVE"),
            LootAction::Ask => write!(f, "ASK"),
        }
    }
}

/// Primitive command understood by the command dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "player", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    Keep,
    Pass(String),
    Leave,
    Destroy,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Keep => write!(f, "keep"),
            CommandKind::Pass(player) => write!(f, "pass:{player}"),
            CommandKind::Leave => write!(f, "leave"),
            CommandKind::Destroy => write!(f, "destroy"),
        }
    }
}
