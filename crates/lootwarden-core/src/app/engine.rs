//! LootEngine - tick orchestration
//!
//! One tick:
//! 1. expire due no-drop waits
//! 2. list personal and shared items; an empty window closes the session
//! 3. open a session if none is active
//! 4. per unprocessed item: metadata -> filter -> cache / resolver -> executor
//!
//! 状態（tracker / cache / waits）は `state` の Mutex が唯一の正本です。
//! executor への submit 中は state のロックを持ちません。confirmation は
//! 別タスクから届くため、ロックを持ったまま待つとデッドロックします。

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::status::{EngineStatus, TickReport};
use crate::config::EngineConfig;
use crate::decision::{DecisionCache, DecisionKey, DecisionResolver, FilterEvaluator};
use crate::domain::{Decision, ListedItem, LootAction, LootEvent, LootItem, Result, SessionId};
use crate::events::EventBus;
use crate::executor::{CommandExecutor, Completion, PendingAction};
use crate::ports::{Clock, Confirmation, IdGenerator, ItemSource, MetadataProvider, PrimaryDecider};
use crate::session::{NoDropWaitTimer, SessionTracker};

/// Why a session is being cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearReason {
    Explicit,
    ZoneChange,
}

impl ClearReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClearReason::Explicit => "explicit",
            ClearReason::ZoneChange => "zone_change",
        }
    }
}

struct EngineState {
    tracker: SessionTracker,
    cache: DecisionCache,
    waits: NoDropWaitTimer,
}

pub struct LootEngine {
    config: Arc<EngineConfig>,
    source: Arc<dyn ItemSource>,
    metadata: Arc<dyn MetadataProvider>,
    authority: Arc<dyn PrimaryDecider>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    filters: FilterEvaluator,
    resolver: DecisionResolver,
    executor: Arc<CommandExecutor>,
    events: Arc<EventBus>,
    state: Mutex<EngineState>,
    /// ticks never overlap
    tick_lock: Mutex<()>,
}

impl LootEngine {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn assemble(
        config: Arc<EngineConfig>,
        source: Arc<dyn ItemSource>,
        metadata: Arc<dyn MetadataProvider>,
        authority: Arc<dyn PrimaryDecider>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        filters: FilterEvaluator,
        resolver: DecisionResolver,
        executor: Arc<CommandExecutor>,
        events: Arc<EventBus>,
    ) -> Self {
        let state = EngineState {
            tracker: SessionTracker::new(config.processed_retention()),
            cache: DecisionCache::new(config.decision_cache_ttl(), config.decision_cache_enabled),
            waits: NoDropWaitTimer::new(config.no_drop_wait()),
        };
        Self {
            config,
            source,
            metadata,
            authority,
            clock,
            ids,
            filters,
            resolver,
            executor,
            events,
            state: Mutex::new(state),
            tick_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn executor(&self) -> &Arc<CommandExecutor> {
        &self.executor
    }

    pub async fn tick(&self) -> Result<TickReport> {
        let _tick = self.tick_lock.lock().await;
        let mut report = TickReport::default();

        report.expired = self.expire_waits().await;

        let personal = self.source.list_items(false).await?;
        let shared = self.source.list_items(true).await?;
        report.listed = personal.len() + shared.len();

        if report.listed == 0 {
            self.close_session("window empty").await;
            return Ok(report);
        }

        let session = self.ensure_session().await?;
        let authorized = shared.is_empty() || self.authority.is_primary_decider().await;

        let items = personal
            .into_iter()
            .map(|i| (i, false))
            .chain(shared.into_iter().map(|i| (i, true)));

        for (listed, is_shared) in items {
            if is_shared && !authorized {
                report.unauthorized += 1;
                continue;
            }
            // 途中で clear_session された場合は残りを捨てる
            if self.current_session().await != Some(session) {
                tracing::debug!(session = %session, "session ended mid-tick");
                break;
            }
            if let Err(e) = self.process_item(session, listed.clone(), is_shared, &mut report).await {
                report.errors += 1;
                tracing::warn!(item = %listed.name, shared = is_shared, error = %e, "item processing failed");
            }
        }

        tracing::debug!(?report, "tick complete");
        Ok(report)
    }

    /// Run the cascade for one item without executing it.
    ///
    /// Uses and fills the decision cache while a session is active, so a
    /// following tick acts on the same decision. Rule writes made by the
    /// cascade (heuristic rules, waterfall consumption) still happen.
    pub async fn preview(&self, item: &LootItem) -> Result<Decision> {
        match self.current_session().await {
            Some(session) => self.decide(session, item).await,
            None => {
                let filter = self.filters.active_filter(item.slot, item.is_shared).await?;
                self.resolver.resolve(item, filter).await
            }
        }
    }

    /// Discard the session, every processed record, the cache, wait timers,
    /// the pending queue, and the executor's busy slot.
    pub async fn clear_session(&self, reason: ClearReason) {
        let cleared = {
            let mut state = self.state.lock().await;
            state.cache.clear();
            state.waits.clear_all();
            state.tracker.clear()
        };
        let dropped = self.executor.reset().await;

        tracing::info!(reason = reason.as_str(), dropped, "session cleared");
        if let Some(session) = cleared {
            self.events
                .publish(LootEvent::SessionClosed {
                    session: session.id,
                    reason: reason.as_str().to_string(),
                })
                .await;
        }
    }

    /// Forward a completion notification from the actor.
    pub async fn confirm(&self, confirmation: Confirmation) -> bool {
        self.executor.confirm(confirmation).await
    }

    pub async fn status(&self) -> EngineStatus {
        let mut status = {
            let state = self.state.lock().await;
            let current = state.tracker.current();
            EngineStatus {
                phase: state.tracker.phase(),
                session: current.map(|s| s.id),
                target: current.map(|s| s.target.clone()),
                processed: state.tracker.processed_in_session(),
                retained_records: state.tracker.total_records(),
                waiting: state.waits.len(),
                queued: 0,
                busy: false,
                cache_entries: state.cache.len(),
                cache_hits: state.cache.hits(),
                cache_misses: state.cache.misses(),
                filter_cache_entries: 0,
                executor: Default::default(),
            }
        };
        status.filter_cache_entries = self.filters.cached_entries().await;
        // executor は state とは別のロック
        status.queued = self.executor.queue_len().await;
        status.busy = self.executor.is_busy().await;
        status.executor = self.executor.stats().await;
        status
    }

    pub async fn is_processed(&self, item_name: &str) -> bool {
        self.state.lock().await.tracker.is_processed(item_name)
    }

    pub async fn is_waiting(&self, item_name: &str) -> bool {
        self.state.lock().await.waits.is_waiting(item_name)
    }

    async fn current_session(&self) -> Option<SessionId> {
        self.state.lock().await.tracker.current().map(|s| s.id)
    }

    async fn ensure_session(&self) -> Result<SessionId> {
        if let Some(id) = self.current_session().await {
            return Ok(id);
        }

        let target = self.source.current_target().await?;
        let id = self.ids.session_id();
        let now = self.clock.now();
        {
            let mut state = self.state.lock().await;
            if !state.tracker.open(id, target.as_str(), now) {
                // clear_session と競合した場合に備えて現行のものを返す
                return Ok(state.tracker.current().map_or(id, |s| s.id));
            }
            let purged = state.tracker.purge_stale(now);
            state.cache.purge_expired(now);
            if purged > 0 {
                tracing::debug!(purged, "dropped stale processed records");
            }
        }

        tracing::info!(session = %id, target = %target, "session opened");
        self.events
            .publish(LootEvent::SessionOpened { session: id, target })
            .await;
        Ok(id)
    }

    async fn close_session(&self, reason: &str) {
        let closed = {
            let mut state = self.state.lock().await;
            state.waits.clear_all();
            state.cache.clear();
            state.tracker.close()
        };
        let Some(session) = closed else {
            return;
        };

        tracing::info!(session = %session.id, reason, "session closed");
        self.events
            .publish(LootEvent::SessionClosed {
                session: session.id,
                reason: reason.to_string(),
            })
            .await;
    }

    async fn expire_waits(&self) -> usize {
        let now = self.clock.now();
        let expired = {
            let mut state = self.state.lock().await;
            let expired = state.waits.expire_due(now);
            for (name, _) in &expired {
                // 放棄したアイテムはこのセッションでは二度と判断しない
                state.tracker.mark_processed(name, LootAction::Leave, now);
                state.cache.invalidate_item(name);
            }
            expired
        };

        for (item, wait) in &expired {
            tracing::info!(item = %item, reason = %wait.reason, "no-drop wait expired, leaving item");
            self.events
                .publish(LootEvent::NoDropWaitExpired {
                    item: item.clone(),
                    reason: wait.reason.clone(),
                })
                .await;
        }
        expired.len()
    }

    async fn process_item(
        &self,
        session: SessionId,
        listed: ListedItem,
        shared: bool,
        report: &mut TickReport,
    ) -> Result<()> {
        if self.state.lock().await.tracker.is_processed(&listed.name) {
            tracing::debug!(item = %listed.name, "already processed");
            report.skipped += 1;
            return Ok(());
        }
        if self.executor.is_pending(&listed.name).await {
            tracing::debug!(item = %listed.name, "already queued");
            report.skipped += 1;
            return Ok(());
        }

        let info = self.metadata.item_info(&listed.name).await;
        let item = LootItem::new(listed, shared, info);
        let decision = self.decide(session, &item).await?;

        if let Some(reason) = decision.wait_reason() {
            self.start_wait(&item, reason).await;
            report.waiting += 1;
            return Ok(());
        }
        self.cancel_wait(&item.name).await;

        if decision.action == LootAction::Ask {
            self.defer(&item).await;
            report.deferred += 1;
            return Ok(());
        }

        let completions = self
            .executor
            .submit(PendingAction::new(&item, decision.action))
            .await;
        self.settle(completions, report).await;
        Ok(())
    }

    async fn decide(&self, session: SessionId, item: &LootItem) -> Result<Decision> {
        let filter = self.filters.active_filter(item.slot, item.is_shared).await?;
        let key = DecisionKey::new(session, &item.name, item.is_shared, filter);

        if let Some(hit) = self.state.lock().await.cache.get(&key, self.clock.now()) {
            tracing::debug!(item = %item.name, action = %hit.action, "decision cache hit");
            return Ok(hit);
        }

        let decision = self.resolver.resolve(item, filter).await?;
        tracing::debug!(item = %item.name, action = %decision.action, origin = ?decision.origin, "resolved");
        // wait は毎 tick 解決し直す。待機中に保存された rule を次の tick で拾うため
        if decision.is_waiting() {
            return Ok(decision);
        }
        self.state
            .lock()
            .await
            .cache
            .insert(key, decision.clone(), self.clock.now());
        Ok(decision)
    }

    async fn start_wait(&self, item: &LootItem, reason: &str) {
        let started = self
            .state
            .lock()
            .await
            .waits
            .start(&item.name, reason, self.clock.now());
        if !started {
            return;
        }

        let wait_secs = self.config.no_drop_wait_secs;
        tracing::info!(item = %item.name, wait_secs, reason, "no-drop wait started");
        self.events
            .publish(LootEvent::NoDropWaitStart {
                item: item.name.clone(),
                wait_secs,
                reason: reason.to_string(),
            })
            .await;
    }

    /// A non-waiting decision means something now resolves the item.
    async fn cancel_wait(&self, item_name: &str) {
        if self.state.lock().await.waits.clear(item_name).is_some() {
            tracing::info!(item = item_name, "no-drop wait cancelled by new decision");
        }
    }

    async fn defer(&self, item: &LootItem) {
        self.state
            .lock()
            .await
            .tracker
            .mark_processed(&item.name, LootAction::Ask, self.clock.now());
        tracing::info!(item = %item.name, "decision deferred to operator");
        self.events
            .publish(LootEvent::DecisionDeferred {
                item: item.name.clone(),
            })
            .await;
    }

    async fn settle(&self, completions: Vec<Completion>, report: &mut TickReport) {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        for c in completions {
            if c.outcome.is_success() {
                state
                    .tracker
                    .mark_processed(&c.pending.item_name, c.pending.action, now);
                report.executed += 1;
            } else {
                // 成功しなかったアイテムは未処理のまま、次の tick で拾い直す
                tracing::debug!(item = %c.pending.item_name, outcome = ?c.outcome, "command not completed");
                report.failed += 1;
            }
        }
    }
}
