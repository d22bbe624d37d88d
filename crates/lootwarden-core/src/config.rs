//! Engine configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Timing fields are stored as plain numbers (ms / secs) to keep the
//! JSON readable; use the accessor methods to get `Duration`s.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{LootError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum spacing between two issued commands.
    pub min_command_spacing_ms: u64,

    /// How long to wait for a confirmation before force-releasing the lock.
    pub confirm_timeout_ms: u64,

    /// Outer ceiling on issuing one command and awaiting its confirmation.
    /// The cooldown before the command is not counted.
    pub safety_ceiling_ms: u64,

    /// Grace period before an unresolved no-drop item is abandoned.
    pub no_drop_wait_secs: u64,

    pub decision_cache_ttl_secs: u64,
    pub decision_cache_enabled: bool,
    pub filter_cache_ttl_secs: u64,

    /// Processed records older than this are purged.
    pub processed_retention_secs: u64,

    /// Greed filter keeps items worth at least this much (copper).
    pub greed_keep_threshold: u64,

    /// Heuristic keeps items worth more than this (copper).
    pub keep_threshold: u64,

    /// Heuristic sells items worth more than this (copper).
    pub sell_threshold: u64,

    /// Heuristic keeps tradeskill items worth more than this (copper).
    pub tradeskill_threshold: u64,

    /// Held-count caps per item name.
    pub quantity_limits: HashMap<String, u32>,

    /// Record commands as completed without contacting the actor.
    pub dry_run: bool,

    pub tick_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_command_spacing_ms: 1500,
            confirm_timeout_ms: 5000,
            safety_ceiling_ms: 10_000,
            no_drop_wait_secs: 300,
            decision_cache_ttl_secs: 30,
            decision_cache_enabled: true,
            filter_cache_ttl_secs: 5,
            processed_retention_secs: 3600,
            greed_keep_threshold: 1000,
            keep_threshold: 1000,
            sell_threshold: 100,
            tradeskill_threshold: 100,
            quantity_limits: HashMap::new(),
            dry_run: false,
            tick_interval_ms: 500,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.safety_ceiling_ms < self.confirm_timeout_ms {
            return Err(LootError::Config(format!(
                "safety_ceiling_ms ({}) must be >= confirm_timeout_ms ({})",
                self.safety_ceiling_ms, self.confirm_timeout_ms
            )));
        }
        if self.keep_threshold < self.sell_threshold {
            return Err(LootError::Config(format!(
                "keep_threshold ({}) must be >= sell_threshold ({})",
                self.keep_threshold, self.sell_threshold
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(LootError::Config("tick_interval_ms must be > 0".into()));
        }
        Ok(())
    }

    pub fn min_command_spacing(&self) -> Duration {
        Duration::from_millis(self.min_command_spacing_ms)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.confirm_timeout_ms)
    }

    pub fn safety_ceiling(&self) -> Duration {
        Duration::from_millis(self.safety_ceiling_ms)
    }

    pub fn no_drop_wait(&self) -> Duration {
        Duration::from_secs(self.no_drop_wait_secs)
    }

    pub fn decision_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.decision_cache_ttl_secs)
    }

    pub fn filter_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.filter_cache_ttl_secs)
    }

    pub fn processed_retention(&self) -> Duration {
        Duration::from_secs(self.processed_retention_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn quantity_limit(&self, item_name: &str) -> Option<u32> {
        self.quantity_limits.get(item_name).copied()
    }
}
