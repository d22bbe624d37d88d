//! Persisted loot rules.
//!
//! Rules are stored as opaque strings by the rule store. They are parsed once
//! into [`Rule`] when read and serialized again only when written back.
//!
//! Grammar（キーワードは大文字小文字を区別しない、プレイヤー名は区別する）:
//! - `KEEP` / `SELL` / `IGNORE` / `DESTROY`
//! - `KEEP|<n>` / `SELL|<n>`: keep until `n` copies are held
//! - `PASS|<player>`
//! - `PassTo|<player>[<n>]|<player>[<n>]|...` (trailing `|` allowed; `PassTo|` is
//!   the exhausted waterfall)
//! - sentinels `CHANGEME` / `ASK`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::action::LootAction;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleParseError {
    #[error("empty rule")]
    Empty,

    #[error("unknown rule keyword '{0}'")]
    UnknownKeyword(String),

    #[error("rule '{0}' takes no arguments")]
    UnexpectedArgument(String),

    #[error("invalid quantity '{0}'")]
    InvalidQuantity(String),

    #[error("PASS rule needs a player name")]
    MissingPlayer,

    #[error("invalid waterfall entry '{0}': expected Player[count]")]
    InvalidWaterfallEntry(String),
}

/// Action carried by a simple rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleAction {
    Keep,
    Sell,
    Ignore,
    Destroy,
}

impl RuleAction {
    fn keyword(self) -> &'static str {
        match self {
            RuleAction::Keep => "KEEP",
            RuleAction::Sell => "SELL",
            RuleAction::Ignore => "IGNORE",
            RuleAction::Destroy => "DESTROY",
        }
    }

    fn accepts_limit(self) -> bool {
        matches!(self, RuleAction::Keep | RuleAction::Sell)
    }
}

impl From<RuleAction> for LootAction {
    fn from(action: RuleAction) -> Self {
        match action {
            RuleAction::Keep => LootAction::Keep,
            RuleAction::Sell => LootAction::Sell,
            RuleAction::Ignore => LootAction::Ignore,
            RuleAction::Destroy => LootAction::Destroy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentinel {
    /// Placeholder written for items nobody has configured yet.
    ChangeMe,
    /// Operator wants to be asked.
    Ask,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterfallEntry {
    pub player: String,
    pub remaining: u32,
}

impl WaterfallEntry {
    pub fn new(player: impl Into<String>, remaining: u32) -> Self {
        Self {
            player: player.into(),
            remaining,
        }
    }
}

/// Ordered, quantity-limited pass assignment. Empty means exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waterfall(Vec<WaterfallEntry>);

impl Waterfall {
    pub fn new(entries: Vec<WaterfallEntry>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[WaterfallEntry] {
        &self.0
    }

    pub fn is_exhausted(&self) -> bool {
        self.0.iter().all(|e| e.remaining == 0)
    }

    /// Take one unit from the first player with a remaining count.
    ///
    /// Players whose count reaches zero are removed, so an exhausted waterfall
    /// always ends up empty.
    pub fn consume(&mut self) -> Option<String> {
        let chosen = self.0.iter_mut().find(|e| e.remaining > 0).map(|entry| {
            entry.remaining -= 1;
            entry.player.clone()
        });
        self.0.retain(|e| e.remaining > 0);
        chosen
    }
}

/// A parsed persisted rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    Simple {
        action: RuleAction,
        limit: Option<u32>,
    },
    PassSingle(String),
    PassWaterfall(Waterfall),
    Sentinel(Sentinel),
}

impl Rule {
    pub fn simple(action: RuleAction) -> Self {
        Rule::Simple {
            action,
            limit: None,
        }
    }
}

impl FromStr for Rule {
    type Err = RuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RuleParseError::Empty);
        }

        let mut parts = s.split('|').map(str::trim);
        let keyword = parts.next().unwrap_or_default();
        // trailing `|` leaves empty pieces behind; they carry nothing
        let args: Vec<&str> = parts.filter(|p| !p.is_empty()).collect();

        let simple = |action: RuleAction| -> Result<Rule, RuleParseError> {
            match args.as_slice() {
                [] => Ok(Rule::simple(action)),
                [n] if action.accepts_limit() => {
                    let limit = n
                        .parse::<u32>()
                        .map_err(|_| RuleParseError::InvalidQuantity(n.to_string()))?;
                    Ok(Rule::Simple {
                        action,
                        limit: Some(limit),
                    })
                }
                _ => Err(RuleParseError::UnexpectedArgument(keyword.to_string())),
            }
        };

        match keyword.to_ascii_uppercase().as_str() {
            "KEEP" => simple(RuleAction::Keep),
            "SELL" => simple(RuleAction::Sell),
            "IGNORE" => simple(RuleAction::Ignore),
            "DESTROY" => simple(RuleAction::Destroy),
            "CHANGEME" | "ASK" if !args.is_empty() => {
                Err(RuleParseError::UnexpectedArgument(keyword.to_string()))
            }
            "CHANGEME" => Ok(Rule::Sentinel(Sentinel::ChangeMe)),
            "ASK" => Ok(Rule::Sentinel(Sentinel::Ask)),
            "PASS" => match args.as_slice() {
                [player] => Ok(Rule::PassSingle(player.to_string())),
                [] => Err(RuleParseError::MissingPlayer),
                _ => Err(RuleParseError::UnexpectedArgument(keyword.to_string())),
            },
            "PASSTO" => args
                .iter()
                .map(|entry| parse_waterfall_entry(entry))
                .collect::<Result<Vec<_>, _>>()
                .map(|entries| Rule::PassWaterfall(Waterfall::new(entries))),
            _ => Err(RuleParseError::UnknownKeyword(keyword.to_string())),
        }
    }
}

fn parse_waterfall_entry(entry: &str) -> Result<WaterfallEntry, RuleParseError> {
    let invalid = || RuleParseError::InvalidWaterfallEntry(entry.to_string());

    let body = entry.strip_suffix(']').ok_or_else(invalid)?;
    let (player, count) = body.split_once('[').ok_or_else(invalid)?;
    let player = player.trim();
    if player.is_empty() {
        return Err(invalid());
    }
    let remaining = count.trim().parse::<u32>().map_err(|_| invalid())?;
    Ok(WaterfallEntry::new(player, remaining))
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Simple {
                action,
                limit: None,
            } => f.write_str(action.keyword()),
            Rule::Simple {
                action,
                limit: Some(n),
            } => write!(f, "{}|{n}", action.keyword()),
            Rule::PassSingle(player) => write!(f, "PASS|{player}"),
            Rule::PassWaterfall(waterfall) => {
                f.write_str("PassTo|")?;
                for entry in waterfall.entries() {
                    write!(f, "{}[{}]|", entry.player, entry.remaining)?;
                }
                Ok(())
            }
            Rule::Sentinel(Sentinel::ChangeMe) => f.write_str("CHANGEME"),
            Rule::Sentinel(Sentinel::Ask) => f.write_str("ASK"),
        }
    }
}
