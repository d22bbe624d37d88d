//! Session & processed-item tracking.
//!
//! State transitions:
//! - NoSession -> Active (loot detected)
//! - Active -> NoSession (window reports empty, explicit close, zone change)
//!
//! Idempotence: an item with a processed record for the active session is
//! never decided again in that session.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{LootAction, SessionId};
use crate::ports::clock::to_delta;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    /// The actor's interaction target when the window was detected.
    pub target: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub session_id: SessionId,
    pub action: LootAction,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    NoSession,
    Active,
}

#[derive(Debug)]
pub struct SessionTracker {
    current: Option<Session>,
    /// item name -> last record (any session until purged)
    processed: HashMap<String, ProcessedRecord>,
    retention: TimeDelta,
}

impl SessionTracker {
    pub fn new(retention: Duration) -> Self {
        Self {
            current: None,
            processed: HashMap::new(),
            retention: to_delta(retention),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.current.is_some() {
            SessionPhase::Active
        } else {
            SessionPhase::NoSession
        }
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Start a session. Returns `false` (and keeps the old one) if one is active.
    pub fn open(&mut self, id: SessionId, target: impl Into<String>, now: DateTime<Utc>) -> bool {
        if self.current.is_some() {
            return false;
        }
        self.current = Some(Session {
            id,
            target: target.into(),
            created_at: now,
        });
        true
    }

    /// End the session because the window went away.
    ///
    /// Records stay until they age out; they no longer match any session.
    pub fn close(&mut self) -> Option<Session> {
        self.current.take()
    }

    /// Drop the session and every processed record.
    pub fn clear(&mut self) -> Option<Session> {
        self.processed.clear();
        self.current.take()
    }

    pub fn is_processed(&self, item_name: &str) -> bool {
        match (&self.current, self.processed.get(item_name)) {
            (Some(session), Some(record)) => record.session_id == session.id,
            _ => false,
        }
    }

    /// Record a final action for an item in the active session.
    ///
    /// Returns `false` when there is no session to record against.
    pub fn mark_processed(&mut self, item_name: &str, action: LootAction, now: DateTime<Utc>) -> bool {
        let Some(session) = &self.current else {
            return false;
        };
        self.processed.insert(
            item_name.to_string(),
            ProcessedRecord {
                session_id: session.id,
                action,
                processed_at: now,
            },
        );
        true
    }

    pub fn record(&self, item_name: &str) -> Option<&ProcessedRecord> {
        self.processed.get(item_name)
    }

    /// Remove records older than the retention window.
    pub fn purge_stale(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.processed.len();
        let retention = self.retention;
        self.processed
            .retain(|_, record| now.signed_duration_since(record.processed_at) < retention);
        before - self.processed.len()
    }

    /// Records belonging to the active session.
    pub fn processed_in_session(&self) -> usize {
        let Some(session) = &self.current else {
            return 0;
        };
        self.processed
            .values()
            .filter(|r| r.session_id == session.id)
            .count()
    }

    pub fn total_records(&self) -> usize {
        self.processed.len()
    }
}
