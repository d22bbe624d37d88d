//! デモ用のシナリオ：一つのコープスと、その上のアイテム

use std::sync::Arc;

use lootwarden_core::domain::{FilterKind, ItemInfo, ListedItem};
use lootwarden_core::impls::{ScriptedLootWindow, StaticFilterProbe, StaticInventory, StaticMetadata};

pub const TARGET: &str = "a_sand_giant";

pub struct Scenario {
    pub window: Arc<ScriptedLootWindow>,
    pub probe: Arc<StaticFilterProbe>,
    pub inventory: Arc<StaticInventory>,
    pub metadata: Arc<StaticMetadata>,
}

/// Rules the demo store starts with, unless `--rules` replaces them.
pub fn default_rules() -> Vec<(String, String)> {
    vec![
        ("Ancient Relic".into(), "PassTo|Bob[1]|".into()),
        ("Bone Chips".into(), "KEEP|20".into()),
        ("Cloth Cap".into(), "IGNORE".into()),
    ]
}

pub async fn build() -> Scenario {
    let metadata = StaticMetadata::new()
        .with("Rusty Sword", ItemInfo::valued(50))
        .with("Ancient Relic", ItemInfo::valued(0).no_drop())
        .with("Fine Steel Ore", ItemInfo::valued(150).tradeskill())
        .with("Jade Ring", ItemInfo::valued(2500).lore())
        .with("Bone Chips", ItemInfo::valued(3))
        .with("Cloth Cap", ItemInfo::valued(12))
        .with("Giant Toe", ItemInfo::valued(0).quest())
        .with("Platinum Coin Pouch", ItemInfo::valued(800).cash_loot());

    let window = Arc::new(ScriptedLootWindow::new());
    let personal = [
        "Rusty Sword",
        "Fine Steel Ore",
        "Jade Ring",
        "Bone Chips",
        "Cloth Cap",
        "Giant Toe",
        "Platinum Coin Pouch",
        "Shimmering Shard",
    ];
    window
        .open(
            TARGET,
            personal
                .iter()
                .enumerate()
                .map(|(slot, name)| ListedItem::new(*name, slot as u32))
                .collect(),
            vec![ListedItem::new("Ancient Relic", 0)],
        )
        .await;

    let probe = Arc::new(StaticFilterProbe::new());
    probe.set(0, true, FilterKind::Never).await;

    let inventory = Arc::new(StaticInventory::new());
    inventory.set("Bone Chips", 4).await;

    Scenario {
        window,
        probe,
        inventory,
        metadata: Arc::new(metadata),
    }
}
