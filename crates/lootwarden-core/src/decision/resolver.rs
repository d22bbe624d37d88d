//! Decision resolver: the three-phase cascade.
//!
//! 1. **Filter override**: an active loot filter wins outright.
//! 2. **Persisted rule**: used only when no filter fired.
//! 3. **Default heuristic**: no filter, no rule (or a sentinel); writes a rule
//!    so the next encounter stops at phase 2.
//!
//! The resolver is stateless apart from the waterfall lock. Starting the
//! no-drop grace timer is left to the caller, based on
//! [`Decision::is_waiting`].

use std::sync::Arc;

use super::heuristic::{Thresholds, default_action};
use super::waterfall::{PassLookup, WaterfallResolver};
use crate::config::EngineConfig;
use crate::domain::{
    Decision, DecisionOrigin, FilterKind, LootAction, LootItem, Result, Rule, RuleAction,
};
use crate::ports::{Inventory, RuleStore};

pub struct DecisionResolver {
    rules: Arc<dyn RuleStore>,
    inventory: Arc<dyn Inventory>,
    waterfall: WaterfallResolver,
    config: Arc<EngineConfig>,
}

impl DecisionResolver {
    pub fn new(
        rules: Arc<dyn RuleStore>,
        inventory: Arc<dyn Inventory>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            waterfall: WaterfallResolver::new(rules.clone()),
            rules,
            inventory,
            config,
        }
    }

    pub async fn resolve(&self, item: &LootItem, filter: Option<FilterKind>) -> Result<Decision> {
        if let Some(kind) = filter {
            return self.filter_phase(item, kind).await;
        }
        if let Some(decision) = self.rule_phase(item).await? {
            return Ok(decision);
        }
        self.heuristic_phase(item).await
    }

    async fn filter_phase(&self, item: &LootItem, kind: FilterKind) -> Result<Decision> {
        let origin = DecisionOrigin::Filter(kind);

        let action = if kind.is_need() {
            self.guard_keep(item, LootAction::Keep, None).await?
        } else if kind.is_greed() {
            if item.value() >= self.config.greed_keep_threshold {
                self.guard_keep(item, LootAction::Keep, None).await?
            } else {
                LootAction::Ignore
            }
        } else {
            match self.waterfall.take_pass(&item.name).await? {
                PassLookup::Player(player) => LootAction::Pass(player),
                PassLookup::Exhausted | PassLookup::NoPassRule if item.info.no_drop => {
                    return Ok(Decision::wait(format!("{kind} filter, no pass rule")));
                }
                PassLookup::Exhausted | PassLookup::NoPassRule => LootAction::Ignore,
            }
        };
        Ok(Decision::new(action, origin))
    }

    /// `None` means "fall through to the heuristic".
    async fn rule_phase(&self, item: &LootItem) -> Result<Option<Decision>> {
        let Some(rule) = self.load_rule(&item.name).await? else {
            return Ok(None);
        };

        let action = match rule {
            Rule::Sentinel(_) => return Ok(None),
            Rule::PassSingle(player) => LootAction::Pass(player),
            Rule::PassWaterfall(_) => match self.waterfall.take_pass(&item.name).await? {
                PassLookup::Player(player) => LootAction::Pass(player),
                // 別経路でルールが書き換えられた場合も含む
                PassLookup::Exhausted | PassLookup::NoPassRule if item.info.no_drop => {
                    return Ok(Some(Decision::wait("pass waterfall exhausted")));
                }
                PassLookup::Exhausted | PassLookup::NoPassRule => LootAction::Leave,
            },
            Rule::Simple { action, limit } => self.guard_keep(item, action.into(), limit).await?,
        };
        Ok(Some(Decision::new(action, DecisionOrigin::Rule)))
    }

    async fn heuristic_phase(&self, item: &LootItem) -> Result<Decision> {
        if !item.info.known {
            return Ok(Decision::new(LootAction::Ask, DecisionOrigin::Heuristic));
        }

        let chosen: RuleAction = default_action(&item.info, Thresholds::from(self.config.as_ref()));
        let rule = Rule::simple(chosen).to_string();
        if let Err(e) = self.rules.save_rule(&item.name, &rule).await {
            // 保存できなくても今回の判断は有効
            tracing::warn!(item = %item.name, error = %e, "failed to persist heuristic rule");
        } else {
            tracing::debug!(item = %item.name, rule = %rule, "wrote default rule");
        }

        let action = self.guard_keep(item, chosen.into(), None).await?;
        Ok(Decision::new(action, DecisionOrigin::Heuristic))
    }

    /// Malformed rules are treated as missing.
    async fn load_rule(&self, item_name: &str) -> Result<Option<Rule>> {
        let Some(raw) = self.rules.get_rule(item_name).await? else {
            return Ok(None);
        };
        match raw.parse::<Rule>() {
            Ok(rule) => Ok(Some(rule)),
            Err(e) => {
                tracing::warn!(item = item_name, rule = %raw, error = %e, "ignoring malformed rule");
                Ok(None)
            }
        }
    }

    /// Lore-duplicate and quantity-cap overrides for actions that take the item.
    async fn guard_keep(
        &self,
        item: &LootItem,
        action: LootAction,
        rule_limit: Option<u32>,
    ) -> Result<LootAction> {
        if !action.takes_item() {
            return Ok(action);
        }

        let limit = match (rule_limit, self.config.quantity_limit(&item.name)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        if !item.info.lore && limit.is_none() {
            return Ok(action);
        }

        let held = self.inventory.held_count(&item.name).await?;
        if item.info.lore && held > 0 {
            tracing::debug!(item = %item.name, held, "lore item already held");
            return Ok(LootAction::Ignore);
        }
        if let Some(limit) = limit
            && held >= limit
        {
            tracing::debug!(item = %item.name, held, limit, "quantity cap reached");
            return Ok(LootAction::Ignore);
        }
        Ok(action)
    }
}
