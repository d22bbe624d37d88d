//! Default heuristic (cascade phase 3).
//!
//! A flat decision table over item attributes. It never recurses: each item
//! walks the table once, top to bottom.

use crate::config::EngineConfig;
use crate::domain::{ItemInfo, RuleAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub keep: u64,
    pub sell: u64,
    pub tradeskill: u64,
}

impl From<&EngineConfig> for Thresholds {
    fn from(config: &EngineConfig) -> Self {
        Self {
            keep: config.keep_threshold,
            sell: config.sell_threshold,
            tradeskill: config.tradeskill_threshold,
        }
    }
}

/// Action for an item nobody wrote a rule for.
///
/// Order: cash → tradeskill → quest → no-drop → value.
/// Callers handle unknown items (`!info.known`) before getting here.
pub fn default_action(info: &ItemInfo, t: Thresholds) -> RuleAction {
    if info.cash_loot {
        return RuleAction::Keep;
    }
    if info.tradeskill {
        return if info.value > t.tradeskill {
            RuleAction::Keep
        } else {
            RuleAction::Sell
        };
    }
    if info.quest {
        return RuleAction::Keep;
    }
    if info.no_drop {
        return if info.value > t.keep {
            RuleAction::Keep
        } else {
            RuleAction::Destroy
        };
    }
    if info.value > t.keep {
        RuleAction::Keep
    } else if info.value > t.sell {
        RuleAction::Sell
    } else {
        RuleAction::Destroy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const T: Thresholds = Thresholds {
        keep: 1000,
        sell: 100,
        tradeskill: 100,
    };

    #[rstest]
    #[case::cash(ItemInfo::valued(1).cash_loot().no_drop(), RuleAction::Keep)]
    #[case::cheap_tradeskill(ItemInfo::valued(50).tradeskill(), RuleAction::Sell)]
    #[case::pricey_tradeskill(ItemInfo::valued(101).tradeskill(), RuleAction::Keep)]
    #[case::tradeskill_beats_quest(ItemInfo::valued(5).tradeskill().quest(), RuleAction::Sell)]
    #[case::quest(ItemInfo::valued(0).quest().no_drop(), RuleAction::Keep)]
    #[case::cheap_no_drop(ItemInfo::valued(500).no_drop(), RuleAction::Destroy)]
    #[case::pricey_no_drop(ItemInfo::valued(1001).no_drop(), RuleAction::Keep)]
    #[case::valuable(ItemInfo::valued(1001), RuleAction::Keep)]
    #[case::at_keep_threshold(ItemInfo::valued(1000), RuleAction::Sell)]
    #[case::sellable(ItemInfo::valued(101), RuleAction::Sell)]
    #[case::at_sell_threshold(ItemInfo::valued(100), RuleAction::Destroy)]
    #[case::rusty_sword(ItemInfo::valued(50), RuleAction::Destroy)]
    fn table(#[case] info: ItemInfo, #[case] expected: RuleAction) {
        assert_eq!(default_action(&info, T), expected);
    }
}
