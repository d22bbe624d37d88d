//! Waterfall resolver: consume one unit of a pass rule.
//!
//! Read, consume and write-back happen under one lock, so two resolutions
//! for the same rule can never hand out the same unit or observe a
//! half-updated count.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{Result, Rule};
use crate::ports::RuleStore;

/// What the stored rule says about passing the item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassLookup {
    /// Pass to this player (waterfall already decremented and persisted).
    Player(String),
    /// A waterfall rule with nobody left in it.
    Exhausted,
    /// No rule, or a rule that is not a pass rule.
    NoPassRule,
}

pub struct WaterfallResolver {
    rules: Arc<dyn RuleStore>,
    lock: Mutex<()>,
}

impl WaterfallResolver {
    pub fn new(rules: Arc<dyn RuleStore>) -> Self {
        Self {
            rules,
            lock: Mutex::new(()),
        }
    }

    pub async fn take_pass(&self, item_name: &str) -> Result<PassLookup> {
        let _guard = self.lock.lock().await;

        let Some(raw) = self.rules.get_rule(item_name).await? else {
            return Ok(PassLookup::NoPassRule);
        };

        match raw.parse::<Rule>() {
            Ok(Rule::PassSingle(player)) => Ok(PassLookup::Player(player)),
            Ok(Rule::PassWaterfall(mut waterfall)) => {
                let chosen = waterfall.consume();
                let updated = Rule::PassWaterfall(waterfall).to_string();
                if updated != raw {
                    self.rules.save_rule(item_name, &updated).await?;
                    tracing::debug!(item = item_name, rule = %updated, "waterfall updated");
                }
                Ok(chosen.map_or(PassLookup::Exhausted, PassLookup::Player))
            }
            _ => Ok(PassLookup::NoPassRule),
        }
    }
}
