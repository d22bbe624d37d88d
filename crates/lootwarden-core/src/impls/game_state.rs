//! Scripted game-client state: loot window, filter flags, inventory, authority.
//!
//! 実際のクライアントの代わりにテストやデモから直接状態を書き換えます。

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{FilterKind, ListedItem, Result};
use crate::ports::{FilterProbe, Inventory, ItemSource, PrimaryDecider};

#[derive(Debug, Default)]
struct Window {
    target: String,
    personal: Vec<ListedItem>,
    shared: Vec<ListedItem>,
}

/// A loot window whose contents are set by hand.
#[derive(Default)]
pub struct ScriptedLootWindow {
    window: Mutex<Window>,
    list_calls: AtomicUsize,
}

impl ScriptedLootWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the window on a new target with the given items.
    pub async fn open(&self, target: impl Into<String>, personal: Vec<ListedItem>, shared: Vec<ListedItem>) {
        let mut w = self.window.lock().await;
        w.target = target.into();
        w.personal = personal;
        w.shared = shared;
    }

    /// Empty both lists, i.e. the window closed.
    pub async fn close(&self) {
        let mut w = self.window.lock().await;
        w.personal.clear();
        w.shared.clear();
    }

    pub async fn push(&self, shared: bool, item: ListedItem) {
        let mut w = self.window.lock().await;
        if shared {
            w.shared.push(item);
        } else {
            w.personal.push(item);
        }
    }

    /// Take the item out of a slot (looted, destroyed, passed on).
    pub async fn remove(&self, slot: u32, shared: bool) -> Option<ListedItem> {
        let mut w = self.window.lock().await;
        let list = if shared { &mut w.shared } else { &mut w.personal };
        let idx = list.iter().position(|i| i.slot == slot)?;
        Some(list.remove(idx))
    }

    pub async fn len(&self) -> usize {
        let w = self.window.lock().await;
        w.personal.len() + w.shared.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItemSource for ScriptedLootWindow {
    async fn list_items(&self, shared: bool) -> Result<Vec<ListedItem>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let w = self.window.lock().await;
        Ok(if shared { w.shared.clone() } else { w.personal.clone() })
    }

    async fn current_target(&self) -> Result<String> {
        Ok(self.window.lock().await.target.clone())
    }
}

/// Filter flags keyed by (slot, shared, kind).
#[derive(Default)]
pub struct StaticFilterProbe {
    active: Mutex<HashSet<(u32, bool, FilterKind)>>,
    queries: AtomicUsize,
}

impl StaticFilterProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, slot: u32, shared: bool, kind: FilterKind) {
        self.active.lock().await.insert((slot, shared, kind));
    }

    pub async fn clear(&self, slot: u32, shared: bool, kind: FilterKind) {
        self.active.lock().await.remove(&(slot, shared, kind));
    }

    /// Total `is_active` calls so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FilterProbe for StaticFilterProbe {
    async fn is_active(&self, slot: u32, shared: bool, filter: FilterKind) -> Result<bool> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.active.lock().await.contains(&(slot, shared, filter)))
    }
}

#[derive(Default)]
pub struct StaticInventory {
    counts: Mutex<HashMap<String, u32>>,
}

impl StaticInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, item_name: impl Into<String>, count: u32) {
        self.counts.lock().await.insert(item_name.into(), count);
    }

    pub async fn add(&self, item_name: &str, count: u32) {
        let mut counts = self.counts.lock().await;
        let held = counts.entry(item_name.to_string()).or_default();
        *held = held.saturating_add(count);
    }
}

#[async_trait]
impl Inventory for StaticInventory {
    async fn held_count(&self, item_name: &str) -> Result<u32> {
        Ok(self.counts.lock().await.get(item_name).copied().unwrap_or(0))
    }
}

/// Fixed answer to "am I the primary decider?".
pub struct FixedAuthority(AtomicBool);

impl FixedAuthority {
    pub fn new(primary: bool) -> Self {
        Self(AtomicBool::new(primary))
    }

    pub fn set(&self, primary: bool) {
        self.0.store(primary, Ordering::SeqCst);
    }
}

#[async_trait]
impl PrimaryDecider for FixedAuthority {
    async fn is_primary_decider(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
