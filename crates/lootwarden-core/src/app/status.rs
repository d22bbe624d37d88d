//! Status - エンジンの状態スナップショット
//!
//! 「なぜこのアイテムが処理されないのか」を説明するための観測用ビューです。

use serde::{Deserialize, Serialize};

use crate::domain::SessionId;
use crate::executor::ExecutorStats;
use crate::session::SessionPhase;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub phase: SessionPhase,
    pub session: Option<SessionId>,
    pub target: Option<String>,
    /// Items with a processed record for the active session.
    pub processed: usize,
    /// All retained records, including earlier sessions.
    pub retained_records: usize,
    pub waiting: usize,
    pub queued: usize,
    pub busy: bool,
    pub cache_entries: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Cached (slot, shared, filter) probe answers.
    pub filter_cache_entries: usize,
    pub executor: ExecutorStats,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub listed: usize,
    /// Already processed this session, or already queued.
    pub skipped: usize,
    /// Shared items seen without primary-decider authority.
    pub unauthorized: usize,
    pub executed: usize,
    pub failed: usize,
    pub deferred: usize,
    pub waiting: usize,
    pub expired: usize,
    pub errors: usize,
}
