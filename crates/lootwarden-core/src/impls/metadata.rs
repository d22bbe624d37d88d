//! StaticMetadata - 固定テーブルによるアイテム情報
//!
//! 未登録のアイテムは `ItemInfo::unknown()` を返します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ItemInfo;
use crate::ports::MetadataProvider;

#[derive(Default)]
pub struct StaticMetadata {
    items: RwLock<HashMap<String, ItemInfo>>,
}

impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration, used while wiring a scenario.
    pub fn with(mut self, name: impl Into<String>, info: ItemInfo) -> Self {
        self.items.get_mut().insert(name.into(), info);
        self
    }

    pub async fn insert(&self, name: impl Into<String>, info: ItemInfo) {
        self.items.write().await.insert(name.into(), info);
    }
}

#[async_trait]
impl MetadataProvider for StaticMetadata {
    async fn item_info(&self, item_name: &str) -> ItemInfo {
        self.items
            .read()
            .await
            .get(item_name)
            .cloned()
            .unwrap_or_else(ItemInfo::unknown)
    }
}
