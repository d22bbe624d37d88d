//! InMemoryRuleStore - 開発用のルールストレージ
//!
//! INI ファイルや DB の代わりに HashMap で保持します。
//! 保存失敗を注入して、エンジンが書き込みエラーに耐えることを確認できます。

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{LootError, Result};
use crate::ports::RuleStore;

#[derive(Default)]
pub struct InMemoryRuleStore {
    rules: Mutex<HashMap<String, String>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, e.g. from a config file.
    pub fn with_rules<I, K, V>(rules: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let rules = rules.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self {
            rules: Mutex::new(rules),
            ..Self::default()
        }
    }

    /// Number of successful `save_rule` calls.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.rules.lock().await.clone()
    }
}

#[async_trait]
impl RuleStore for InMemoryRuleStore {
    async fn get_rule(&self, item_name: &str) -> Result<Option<String>> {
        Ok(self.rules.lock().await.get(item_name).cloned())
    }

    async fn save_rule(&self, item_name: &str, rule: &str) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(LootError::port("rule_store", "write rejected"));
        }
        self.rules
            .lock()
            .await
            .insert(item_name.to_string(), rule.to_string());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejected_writes_leave_rules_untouched() {
        let store = InMemoryRuleStore::with_rules([("Gem", "KEEP")]);
        store.fail_saves(true);

        assert!(store.save_rule("Gem", "DESTROY").await.is_err());
        assert_eq!(store.get_rule("Gem").await.unwrap().as_deref(), Some("KEEP"));
        assert_eq!(store.save_count(), 0);
    }
}
