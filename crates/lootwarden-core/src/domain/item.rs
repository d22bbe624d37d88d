//! Item model: what the loot window lists and what metadata says about it.

use serde::{Deserialize, Serialize};

/// One entry as listed by the item source (name + slot only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedItem {
    pub name: String,
    pub slot: u32,
}

impl ListedItem {
    pub fn new(name: impl Into<String>, slot: u32) -> Self {
        Self {
            name: name.into(),
            slot,
        }
    }
}

/// Metadata about an item.
///
/// Lookup never fails: an unknown item is represented by [`ItemInfo::unknown`]
/// (every flag false, value 0, `known == false`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemInfo {
    /// Vendor value in copper.
    pub value: u64,
    pub no_drop: bool,
    pub lore: bool,
    pub quest: bool,
    pub tradeskill: bool,
    pub collectible: bool,
    pub cash_loot: bool,

    /// false when the metadata provider could not resolve the item.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub known: bool,
}

impl ItemInfo {
    pub fn unknown() -> Self {
        Self::default()
    }

    /// A known item with the given value and no flags set.
    pub fn valued(value: u64) -> Self {
        Self {
            value,
            known: true,
            ..Self::default()
        }
    }

    pub fn no_drop(mut self) -> Self {
        self.no_drop = true;
        self
    }

    pub fn lore(mut self) -> Self {
        self.lore = true;
        self
    }

    pub fn quest(mut self) -> Self {
        self.quest = true;
        self
    }

    pub fn tradeskill(mut self) -> Self {
        self.tradeskill = true;
        self
    }

    pub fn collectible(mut self) -> Self {
        self.collectible = true;
        self
    }

    pub fn cash_loot(mut self) -> Self {
        self.cash_loot = true;
        self
    }
}

/// An item offered by the loot window, combined with its metadata.
///
/// Built fresh on every tick; the engine never keeps these around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootItem {
    pub name: String,
    pub slot: u32,
    pub is_shared: bool,
    pub info: ItemInfo,
}

impl LootItem {
    pub fn new(listed: ListedItem, is_shared: bool, info: ItemInfo) -> Self {
        Self {
            name: listed.name,
            slot: listed.slot,
            is_shared,
            info,
        }
    }

    pub fn value(&self) -> u64 {
        self.info.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_info_has_no_flags() {
        let info = ItemInfo::unknown();
        assert!(!info.known);
        assert_eq!(info.value, 0);
        assert!(!info.no_drop && !info.lore && !info.quest);
    }

    #[test]
    fn missing_fields_default_when_deserialized() {
        let info: ItemInfo = serde_json::from_str(r#"{ "value": 250, "lore": true, "known": true }"#).unwrap();
        assert_eq!(info, ItemInfo::valued(250).lore());
    }

    #[test]
    fn loot_item_takes_name_and_slot_from_listing() {
        let item = LootItem::new(ListedItem::new("Bone Chips", 3), true, ItemInfo::valued(4));
        assert_eq!(item.name, "Bone Chips");
        assert_eq!(item.slot, 3);
        assert!(item.is_shared);
        assert_eq!(item.value(), 4);
    }
}
