//! RuleStore / MetadataProvider ports
//!
//! ルールの永続化（INI / DB）とアイテム情報の検索は外部に任せます。
//! ルールは不透明な文字列として保存され、解釈はエンジン側で行います。

use async_trait::async_trait;

use crate::domain::{ItemInfo, Result};

/// Persistent per-item rule strings.
#[async_trait]
pub trait RuleStore: Send + Sync {
    async fn get_rule(&self, item_name: &str) -> Result<Option<String>>;

    async fn save_rule(&self, item_name: &str, rule: &str) -> Result<()>;
}

/// Item metadata lookup.
///
/// Never fails: an unresolvable item comes back as [`ItemInfo::unknown`].
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn item_info(&self, item_name: &str) -> ItemInfo;
}
