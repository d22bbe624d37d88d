//! Domain model (IDs, items, actions, rules, decisions, events, errors).

pub mod action;
pub mod decision;
pub mod errors;
pub mod events;
pub mod filter;
pub mod ids;
pub mod item;
pub mod rule;

pub use action::{CommandKind, LootAction};
pub use decision::{Decision, DecisionOrigin};
pub use errors::{LootError, Result};
pub use events::LootEvent;
pub use filter::{FilterKind, filter_signature};
pub use ids::{CommandId, SessionId};
pub use item::{ItemInfo, ListedItem, LootItem};
pub use rule::{Rule, RuleAction, RuleParseError, Sentinel, Waterfall, WaterfallEntry};
