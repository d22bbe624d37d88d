//! SimulatedClient - ゲームクライアントの代わり
//!
//! `CommandDispatcher` として受け取ったコマンドを記録し、`ClientDriver` が
//! 遅延の後に確認（confirmation）を返します。
//!
//! # 使用例
//! ```ignore
//! let (client, driver) = SimulatedClient::new(Duration::from_millis(200), ConfirmMode::WithId);
//! let executor = Arc::new(CommandExecutor::new(Arc::new(client.clone()), ids, bus, &config));
//! driver.spawn(executor.clone());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::domain::{CommandKind, LootError, Result};
use crate::executor::CommandExecutor;
use crate::impls::{ScriptedLootWindow, StaticInventory};
use crate::ports::{Command, CommandDispatcher, Confirmation};

/// How the driver answers each command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmMode {
    /// Echo the command id back.
    WithId,
    /// Confirm without an id, like a chat-line trigger would.
    Positional,
    /// Never confirm; every command times out.
    Never,
}

#[derive(Debug, Clone)]
pub struct IssuedCommand {
    pub command: Command,
    pub at: Instant,
}

#[derive(Clone)]
pub struct SimulatedClient {
    outbox: mpsc::UnboundedSender<Command>,
    issued: Arc<Mutex<Vec<IssuedCommand>>>,
    offline: Arc<AtomicBool>,
}

impl SimulatedClient {
    pub fn new(latency: Duration, mode: ConfirmMode) -> (Self, ClientDriver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = Self {
            outbox: tx,
            issued: Arc::new(Mutex::new(Vec::new())),
            offline: Arc::new(AtomicBool::new(false)),
        };
        let driver = ClientDriver {
            inbox: rx,
            latency,
            mode,
            window: None,
            inventory: None,
        };
        (client, driver)
    }

    /// While offline, `issue` fails and nothing is recorded.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Every command received so far, with its issue time.
    pub async fn issued(&self) -> Vec<IssuedCommand> {
        self.issued.lock().await.clone()
    }
}

#[async_trait]
impl CommandDispatcher for SimulatedClient {
    async fn issue(&self, command: &Command) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LootError::Dispatch("client offline".into()));
        }
        self.issued.lock().await.push(IssuedCommand {
            command: command.clone(),
            at: Instant::now(),
        });
        // driver が既に止まっていても issue 自体は成功扱い（確認が来ないだけ）
        if self.outbox.send(command.clone()).is_err() {
            tracing::debug!(command = %command.id, "client driver gone");
        }
        Ok(())
    }
}

/// Applies commands to the scripted world and sends confirmations back.
pub struct ClientDriver {
    inbox: mpsc::UnboundedReceiver<Command>,
    latency: Duration,
    mode: ConfirmMode,
    window: Option<Arc<ScriptedLootWindow>>,
    inventory: Option<Arc<StaticInventory>>,
}

impl ClientDriver {
    /// Remove items from this window when a command takes them out.
    pub fn with_window(mut self, window: Arc<ScriptedLootWindow>) -> Self {
        self.window = Some(window);
        self
    }

    /// Count kept items into this inventory.
    pub fn with_inventory(mut self, inventory: Arc<StaticInventory>) -> Self {
        self.inventory = Some(inventory);
        self
    }

    /// Runs until every `SimulatedClient` clone is dropped.
    pub fn spawn(mut self, executor: Arc<CommandExecutor>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(command) = self.inbox.recv().await {
                tokio::time::sleep(self.latency).await;
                let confirmation = match self.mode {
                    ConfirmMode::WithId => Confirmation::for_command(&command),
                    ConfirmMode::Positional => Confirmation::positional(command.kind.clone()),
                    // 実行されなかった扱い
                    ConfirmMode::Never => continue,
                };
                self.apply(&command).await;
                executor.confirm(confirmation).await;
            }
        })
    }

    async fn apply(&self, command: &Command) {
        if matches!(command.kind, CommandKind::Leave) {
            return;
        }
        if let Some(window) = &self.window {
            window.remove(command.slot, command.shared).await;
        }
        if command.kind == CommandKind::Keep
            && let Some(inventory) = &self.inventory
        {
            inventory.add(&command.item_name, 1).await;
        }
    }
}
