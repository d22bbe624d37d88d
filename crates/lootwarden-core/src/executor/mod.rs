//! Command executor / cooldown queue.
//!
//! The only component that talks to the command dispatcher. The external
//! actor cannot handle overlapping commands, so:
//!
//! - a single busy slot (`in_flight`) means at most one command is in flight
//! - consecutive commands are spaced by at least `min_command_spacing`
//! - completion is an explicit single-slot oneshot, filled by [`CommandExecutor::confirm`]
//! - calls made while busy are queued FIFO and run by whoever holds the slot
//!
//! 状態遷移（busy slot）:
//! - idle -> claimed (submit / drain) -> awaiting confirmation -> idle
//! - awaiting confirmation -> idle (timeout で強制解放, reset で破棄)

pub mod pending;

pub use self::pending::{Completion, ExecOutcome, PendingAction};

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, oneshot};
use tokio::time::Instant;

use crate::config::EngineConfig;
use crate::domain::{CommandId, CommandKind, LootEvent};
use crate::events::EventBus;
use crate::ports::{Command, CommandDispatcher, Confirmation, IdGenerator};

struct InFlight {
    id: CommandId,
    item_name: String,
    kind: Option<CommandKind>,
    waiter: Option<oneshot::Sender<CommandKind>>,
}

#[derive(Default)]
struct ExecutorState {
    /// busy flag: `Some` while a command is claimed or awaiting confirmation
    in_flight: Option<InFlight>,
    last_command_at: Option<Instant>,
    queue: VecDeque<PendingAction>,
    stats: ExecutorStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorStats {
    pub issued: u64,
    pub confirmed: u64,
    pub dry_run: u64,
    pub timed_out: u64,
    pub cancelled: u64,
    pub dispatch_failed: u64,
}

pub struct CommandExecutor {
    dispatcher: Arc<dyn CommandDispatcher>,
    ids: Arc<dyn IdGenerator>,
    events: Arc<EventBus>,
    spacing: Duration,
    confirm_timeout: Duration,
    safety_ceiling: Duration,
    dry_run: bool,
    state: Mutex<ExecutorState>,
}

impl CommandExecutor {
    pub fn new(
        dispatcher: Arc<dyn CommandDispatcher>,
        ids: Arc<dyn IdGenerator>,
        events: Arc<EventBus>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            dispatcher,
            ids,
            events,
            spacing: config.min_command_spacing(),
            confirm_timeout: config.confirm_timeout(),
            safety_ceiling: config.safety_ceiling(),
            dry_run: config.dry_run,
            state: Mutex::new(ExecutorState::default()),
        }
    }

    /// Queue an action and, if the channel is free, run the queue.
    ///
    /// Returns the completions this call executed, in issue order. If another
    /// caller currently holds the busy slot the action is only queued, the
    /// returned list is empty, and that caller runs it.
    pub async fn submit(&self, action: PendingAction) -> Vec<Completion> {
        let mut next = {
            let mut state = self.state.lock().await;
            state.queue.push_back(action);
            if state.in_flight.is_some() {
                tracing::debug!(queued = state.queue.len(), "executor busy, action queued");
                return Vec::new();
            }
            self.claim_next(&mut state)
        };

        let mut completions = Vec::new();
        while let Some((id, pending)) = next {
            completions.push(self.run(id, pending).await);
            next = {
                let mut state = self.state.lock().await;
                if state.in_flight.is_some() {
                    None
                } else {
                    self.claim_next(&mut state)
                }
            };
        }
        completions
    }

    /// Deliver a completion notification from the actor.
    ///
    /// Returns `true` if it released the in-flight command.
    pub async fn confirm(&self, confirmation: Confirmation) -> bool {
        let mut state = self.state.lock().await;
        let Some(flight) = state.in_flight.as_mut() else {
            tracing::warn!(kind = %confirmation.kind, "confirmation with no command in flight");
            return false;
        };
        if let Some(id) = confirmation.command_id
            && id != flight.id
        {
            tracing::warn!(expected = %flight.id, got = %id, "uncorrelated confirmation ignored");
            return false;
        }
        if flight.kind.as_ref() != Some(&confirmation.kind) {
            tracing::warn!(
                command = %flight.id,
                item = %flight.item_name,
                kind = %confirmation.kind,
                "confirmation kind differs from issued command"
            );
        }
        match flight.waiter.take() {
            // 受信側が既に timeout していれば send は失敗するが問題ない
            Some(waiter) => waiter.send(confirmation.kind).is_ok(),
            None => {
                tracing::warn!(command = %flight.id, "confirmation before issue or duplicate");
                false
            }
        }
    }

    /// Drop the queue and release the busy slot unconditionally.
    ///
    /// A command awaiting confirmation completes as [`ExecOutcome::Cancelled`].
    /// Returns the number of queued actions that were dropped.
    pub async fn reset(&self) -> usize {
        let mut state = self.state.lock().await;
        let dropped = state.queue.len();
        state.queue.clear();
        if let Some(flight) = state.in_flight.take() {
            tracing::info!(command = %flight.id, item = %flight.item_name, "released in-flight command");
        }
        dropped
    }

    pub async fn is_busy(&self) -> bool {
        self.state.lock().await.in_flight.is_some()
    }

    /// Is this item queued or in flight?
    pub async fn is_pending(&self, item_name: &str) -> bool {
        let state = self.state.lock().await;
        state
            .in_flight
            .as_ref()
            .is_some_and(|f| f.item_name == item_name)
            || state.queue.iter().any(|p| p.item_name == item_name)
    }

    pub async fn queue_len(&self) -> usize {
        self.state.lock().await.queue.len()
    }

    pub async fn stats(&self) -> ExecutorStats {
        self.state.lock().await.stats
    }

    fn claim_next(&self, state: &mut ExecutorState) -> Option<(CommandId, PendingAction)> {
        let pending = state.queue.pop_front()?;
        let id = self.ids.command_id();
        state.in_flight = Some(InFlight {
            id,
            item_name: pending.item_name.clone(),
            kind: pending.action.command_kind(),
            waiter: None,
        });
        Some((id, pending))
    }

    async fn run(&self, id: CommandId, pending: PendingAction) -> Completion {
        // cooldown は safety ceiling の外側で待つ
        self.cooldown().await;
        let outcome = match tokio::time::timeout(self.safety_ceiling, self.perform(id, &pending)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(
                    command = %id,
                    item = %pending.item_name,
                    ceiling_ms = self.safety_ceiling.as_millis() as u64,
                    "command hit the safety ceiling"
                );
                ExecOutcome::TimedOut
            }
        };

        self.release(id, &outcome).await;

        match &outcome {
            ExecOutcome::Confirmed | ExecOutcome::DryRun => {
                tracing::info!(item = %pending.item_name, action = %pending.action, outcome = ?outcome, "command completed");
                if let Some(event) = LootEvent::completed(&pending.item_name, &pending.action, pending.value) {
                    self.events.publish(event).await;
                }
            }
            ExecOutcome::TimedOut => {
                self.events
                    .publish(LootEvent::CommandTimedOut {
                        item: pending.item_name.clone(),
                        action: pending.action.clone(),
                    })
                    .await;
            }
            _ => {}
        }

        Completion {
            command_id: id,
            pending,
            outcome,
        }
    }

    /// (a) wait until `min_command_spacing` has passed since the last command.
    async fn cooldown(&self) {
        let ready_at = {
            let state = self.state.lock().await;
            state.last_command_at.map(|t| t + self.spacing)
        };
        if let Some(ready_at) = ready_at {
            tokio::time::sleep_until(ready_at).await;
        }
    }

    async fn perform(&self, id: CommandId, pending: &PendingAction) -> ExecOutcome {
        // (b) dry run
        if self.dry_run {
            tracing::info!(command = %id, item = %pending.item_name, action = %pending.action, "dry run: command not sent");
            return ExecOutcome::DryRun;
        }

        let Some(kind) = pending.action.command_kind() else {
            return ExecOutcome::NoCommand;
        };
        let command = Command {
            id,
            slot: pending.slot,
            shared: pending.shared,
            kind,
            item_name: pending.item_name.clone(),
        };

        // (c) issue and await confirmation
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.state.lock().await;
            match state.in_flight.as_mut() {
                Some(flight) if flight.id == id => flight.waiter = Some(tx),
                _ => return ExecOutcome::Cancelled,
            }
            state.last_command_at = Some(Instant::now());
            state.stats.issued += 1;
        }

        if let Err(e) = self.dispatcher.issue(&command).await {
            tracing::warn!(command = %id, item = %pending.item_name, error = %e, "dispatch failed");
            return ExecOutcome::DispatchFailed(e.to_string());
        }
        tracing::debug!(command = %id, slot = command.slot, shared = command.shared, kind = %command.kind, "command issued");

        match tokio::time::timeout(self.confirm_timeout, rx).await {
            Ok(Ok(_)) => ExecOutcome::Confirmed,
            Ok(Err(_)) => ExecOutcome::Cancelled,
            Err(_) => {
                tracing::warn!(
                    command = %id,
                    item = %pending.item_name,
                    timeout_ms = self.confirm_timeout.as_millis() as u64,
                    "no confirmation, releasing lock"
                );
                ExecOutcome::TimedOut
            }
        }
    }

    /// (d) clear busy, stamp the command time, count the outcome.
    async fn release(&self, id: CommandId, outcome: &ExecOutcome) {
        let mut state = self.state.lock().await;
        match outcome {
            ExecOutcome::Confirmed => state.stats.confirmed += 1,
            ExecOutcome::DryRun => state.stats.dry_run += 1,
            ExecOutcome::TimedOut => state.stats.timed_out += 1,
            ExecOutcome::Cancelled => state.stats.cancelled += 1,
            ExecOutcome::DispatchFailed(_) => state.stats.dispatch_failed += 1,
            ExecOutcome::NoCommand => {}
        }
        // reset 後に別のコマンドが slot を取っていたら触らない
        if state.in_flight.as_ref().is_some_and(|f| f.id == id) {
            state.in_flight = None;
            state.last_command_at = Some(Instant::now());
        }
    }
}
