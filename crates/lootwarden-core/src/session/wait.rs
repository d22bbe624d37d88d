//! No-drop wait timer.
//!
//! Per item: NotWaiting -> Waiting(start) -> Expired.
//! At most one entry per item; starting again while waiting is a no-op, so
//! the grace period is never restarted by repeated resolutions.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ports::clock::to_delta;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingItem {
    pub start_time: DateTime<Utc>,
    pub wait_time: Duration,
    pub reason: String,
}

impl WaitingItem {
    pub fn deadline(&self) -> DateTime<Utc> {
        self.start_time + to_delta(self.wait_time)
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline()
    }
}

#[derive(Debug)]
pub struct NoDropWaitTimer {
    waiting: HashMap<String, WaitingItem>,
    wait_time: Duration,
}

impl NoDropWaitTimer {
    pub fn new(wait_time: Duration) -> Self {
        Self {
            waiting: HashMap::new(),
            wait_time,
        }
    }

    /// Returns `true` only when a new wait actually started.
    pub fn start(&mut self, item_name: &str, reason: impl Into<String>, now: DateTime<Utc>) -> bool {
        if self.waiting.contains_key(item_name) {
            return false;
        }
        self.waiting.insert(
            item_name.to_string(),
            WaitingItem {
                start_time: now,
                wait_time: self.wait_time,
                reason: reason.into(),
            },
        );
        true
    }

    pub fn get(&self, item_name: &str) -> Option<&WaitingItem> {
        self.waiting.get(item_name)
    }

    pub fn is_waiting(&self, item_name: &str) -> bool {
        self.waiting.contains_key(item_name)
    }

    /// Cancel a wait, e.g. because a rule now resolves the item.
    pub fn clear(&mut self, item_name: &str) -> Option<WaitingItem> {
        self.waiting.remove(item_name)
    }

    pub fn clear_all(&mut self) {
        self.waiting.clear();
    }

    /// Remove and return every entry whose grace period is over.
    pub fn expire_due(&mut self, now: DateTime<Utc>) -> Vec<(String, WaitingItem)> {
        let due: Vec<String> = self
            .waiting
            .iter()
            .filter(|(_, w)| w.is_due(now))
            .map(|(name, _)| name.clone())
            .collect();

        let mut expired: Vec<(String, WaitingItem)> = due
            .into_iter()
            .filter_map(|name| self.waiting.remove(&name).map(|w| (name, w)))
            .collect();
        expired.sort_by_key(|(_, w)| w.start_time);
        expired
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}
