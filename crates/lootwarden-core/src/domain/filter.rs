//! Loot filter categories exposed by the external actor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Six independent per-item filter flags, in evaluation priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    AlwaysNeed,
    Need,
    AlwaysGreed,
    Greed,
    Never,
    No,
}

impl FilterKind {
    /// Fixed priority: the first active filter in this order wins.
    pub const PRIORITY: [FilterKind; 6] = [
        FilterKind::AlwaysNeed,
        FilterKind::Need,
        FilterKind::AlwaysGreed,
        FilterKind::Greed,
        FilterKind::Never,
        FilterKind::No,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::AlwaysNeed => "always_need",
            FilterKind::Need => "need",
            FilterKind::AlwaysGreed => "always_greed",
            FilterKind::Greed => "greed",
            FilterKind::Never => "never",
            FilterKind::No => "no",
        }
    }

    pub fn is_need(self) -> bool {
        matches!(self, FilterKind::AlwaysNeed | FilterKind::Need)
    }

    pub fn is_greed(self) -> bool {
        matches!(self, FilterKind::AlwaysGreed | FilterKind::Greed)
    }

    pub fn is_refusal(self) -> bool {
        matches!(self, FilterKind::Never | FilterKind::No)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache-key form of "which filter, if any, fired".
pub fn filter_signature(active: Option<FilterKind>) -> &'static str {
    active.map_or("none", FilterKind::as_str)
}
