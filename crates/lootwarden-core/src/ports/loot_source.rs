//! Loot-window ports: the item source, per-slot filter flags, and inventory.
//!
//! All three are views onto the external actor (the game client).

use async_trait::async_trait;

use crate::domain::{FilterKind, ListedItem, Result};

/// Lists what the loot window currently offers.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Items in window order. An empty list means the window is empty/closed.
    async fn list_items(&self, shared: bool) -> Result<Vec<ListedItem>>;

    /// Identity of whatever the actor is currently looting (corpse, chest, ...).
    async fn current_target(&self) -> Result<String>;
}

/// Answers "is filter X active for the item in this slot?".
#[async_trait]
pub trait FilterProbe: Send + Sync {
    async fn is_active(&self, slot: u32, shared: bool, filter: FilterKind) -> Result<bool>;
}

/// How many copies of an item the actor already holds.
#[async_trait]
pub trait Inventory: Send + Sync {
    async fn held_count(&self, item_name: &str) -> Result<u32>;
}

/// Gate for shared loot: only the primary decider acts on it.
#[async_trait]
pub trait PrimaryDecider: Send + Sync {
    async fn is_primary_decider(&self) -> bool;
}
