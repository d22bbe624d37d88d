//! Shared fixture: a fully wired engine over the in-memory impls.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use lootwarden_core::domain::{ItemInfo, ListedItem, Result};
use lootwarden_core::impls::{
    ConfirmMode, FixedAuthority, InMemoryRuleStore, RecordingHandler, ScriptedLootWindow,
    SimulatedClient, StaticFilterProbe, StaticInventory, StaticMetadata,
};
use lootwarden_core::ports::{FixedClock, RuleStore, UlidGenerator};
use lootwarden_core::{EngineBuilder, EngineConfig, LootEngine};

/// Rule store that counts reads, to observe how often the cascade runs.
pub struct CountingRules {
    inner: InMemoryRuleStore,
    reads: AtomicUsize,
}

impl CountingRules {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RuleStore for CountingRules {
    async fn get_rule(&self, item_name: &str) -> Result<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_rule(item_name).await
    }

    async fn save_rule(&self, item_name: &str, rule: &str) -> Result<()> {
        self.inner.save_rule(item_name, rule).await
    }
}

pub struct World {
    pub engine: Arc<LootEngine>,
    pub window: Arc<ScriptedLootWindow>,
    pub probe: Arc<StaticFilterProbe>,
    pub inventory: Arc<StaticInventory>,
    pub metadata: Arc<StaticMetadata>,
    pub rules: Arc<CountingRules>,
    pub authority: Arc<FixedAuthority>,
    pub client: SimulatedClient,
    pub recorder: Arc<RecordingHandler>,
    pub clock: FixedClock,
}

impl World {
    /// Must be called inside a tokio runtime: the client driver is spawned.
    pub fn new(config: EngineConfig, mode: ConfirmMode) -> Self {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap());
        let window = Arc::new(ScriptedLootWindow::new());
        let probe = Arc::new(StaticFilterProbe::new());
        let inventory = Arc::new(StaticInventory::new());
        let metadata = Arc::new(StaticMetadata::new());
        let rules = Arc::new(CountingRules {
            inner: InMemoryRuleStore::new(),
            reads: AtomicUsize::new(0),
        });
        let authority = Arc::new(FixedAuthority::new(true));
        let recorder = Arc::new(RecordingHandler::new());
        let (client, driver) = SimulatedClient::new(Duration::from_millis(100), mode);

        let engine = EngineBuilder::new(config)
            .item_source(window.clone())
            .metadata(metadata.clone())
            .rule_store(rules.clone())
            .filter_probe(probe.clone())
            .inventory(inventory.clone())
            .dispatcher(Arc::new(client.clone()))
            .authority(authority.clone())
            .clock(Arc::new(clock.clone()))
            .id_generator(Arc::new(UlidGenerator::new(clock.clone())))
            .register_handler("recorder", recorder.clone())
            .unwrap()
            .build()
            .unwrap();
        let engine = Arc::new(engine);

        driver
            .with_window(window.clone())
            .with_inventory(inventory.clone())
            .spawn(engine.executor().clone());

        Self {
            engine,
            window,
            probe,
            inventory,
            metadata,
            rules,
            authority,
            client,
            recorder,
            clock,
        }
    }

    pub async fn item(&self, name: &str, info: ItemInfo) {
        self.metadata.insert(name, info).await;
    }

    /// Open the window with personal items in slot order.
    pub async fn open(&self, target: &str, personal: &[&str], shared: &[&str]) {
        let list = |names: &[&str]| {
            names
                .iter()
                .enumerate()
                .map(|(slot, n)| ListedItem::new(*n, slot as u32))
                .collect::<Vec<_>>()
        };
        self.window.open(target, list(personal), list(shared)).await;
    }

    pub async fn ticks(&self, n: usize) {
        for _ in 0..n {
            self.engine.tick().await.unwrap();
        }
    }

    pub async fn issued_items(&self) -> Vec<String> {
        self.client
            .issued()
            .await
            .into_iter()
            .map(|i| i.command.item_name)
            .collect()
    }
}
