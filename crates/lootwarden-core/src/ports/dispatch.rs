//! CommandDispatcher port - 外部アクターへのコマンド発行
//!
//! dispatch は fire-and-forget です。完了は後から [`Confirmation`] として
//! `CommandExecutor::confirm` に届きます。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{CommandId, CommandKind, Result};

/// One primitive command against a loot slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub id: CommandId,
    pub slot: u32,
    pub shared: bool,
    pub kind: CommandKind,
    pub item_name: String,
}

/// Completion notification from the external actor.
///
/// `command_id` is optional: without it the confirmation is matched to
/// whatever command is currently in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_id: Option<CommandId>,
    pub kind: CommandKind,
}

impl Confirmation {
    pub fn for_command(command: &Command) -> Self {
        Self {
            command_id: Some(command.id),
            kind: command.kind.clone(),
        }
    }

    pub fn positional(kind: CommandKind) -> Self {
        Self {
            command_id: None,
            kind,
        }
    }
}

/// Issues commands to the external actor.
///
/// Must not wait for completion; returning `Ok` only means the command was sent.
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    async fn issue(&self, command: &Command) -> Result<()>;
}
