//! EngineBuilder - エンジンの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 不足している collaborator を一度に全部報告する

use std::sync::Arc;

use super::engine::LootEngine;
use crate::config::EngineConfig;
use crate::decision::{DecisionResolver, FilterEvaluator};
use crate::domain::LootError;
use crate::events::{EventBus, LootEventHandler};
use crate::executor::CommandExecutor;
use crate::ports::{
    Clock, CommandDispatcher, FilterProbe, IdGenerator, Inventory, ItemSource, MetadataProvider,
    PrimaryDecider, RuleStore, SystemClock, UlidGenerator,
};

/// EngineBuilder は LootEngine を構築
///
/// # 使用例
/// ```ignore
/// let engine = EngineBuilder::new(config)
///     .item_source(window.clone())
///     .metadata(Arc::new(StaticMetadata::new()))
///     .rule_store(rules)
///     .filter_probe(probe)
///     .inventory(inventory)
///     .dispatcher(Arc::new(client))
///     .authority(Arc::new(FixedAuthority::new(true)))
///     .register_handler("log", Arc::new(TracingEventHandler))?
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - build() 時に config を検証
/// - clock / id generator 以外の collaborator が欠けていれば BuildError
pub struct EngineBuilder {
    config: EngineConfig,
    source: Option<Arc<dyn ItemSource>>,
    metadata: Option<Arc<dyn MetadataProvider>>,
    rules: Option<Arc<dyn RuleStore>>,
    probe: Option<Arc<dyn FilterProbe>>,
    inventory: Option<Arc<dyn Inventory>>,
    dispatcher: Option<Arc<dyn CommandDispatcher>>,
    authority: Option<Arc<dyn PrimaryDecider>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    events: EventBus,
}

/// BuildError はエンジン構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing collaborators: {0:?}. These ports must be provided before build().")]
    MissingCollaborators(Vec<&'static str>),
    #[error("invalid engine config")]
    InvalidConfig(#[source] LootError),
}

impl EngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            source: None,
            metadata: None,
            rules: None,
            probe: None,
            inventory: None,
            dispatcher: None,
            authority: None,
            clock: None,
            ids: None,
            events: EventBus::new(),
        }
    }

    pub fn item_source(mut self, source: Arc<dyn ItemSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn metadata(mut self, metadata: Arc<dyn MetadataProvider>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn rule_store(mut self, rules: Arc<dyn RuleStore>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn filter_probe(mut self, probe: Arc<dyn FilterProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn inventory(mut self, inventory: Arc<dyn Inventory>) -> Self {
        self.inventory = Some(inventory);
        self
    }

    pub fn dispatcher(mut self, dispatcher: Arc<dyn CommandDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn authority(mut self, authority: Arc<dyn PrimaryDecider>) -> Self {
        self.authority = Some(authority);
        self
    }

    /// Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Defaults to a ULID generator on the system clock.
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Handler を登録（名前の重複はエラー）
    pub fn register_handler(
        mut self,
        name: impl Into<String>,
        handler: Arc<dyn LootEventHandler>,
    ) -> Result<Self, LootError> {
        self.events.register(name, handler)?;
        Ok(self)
    }

    /// # 検証
    /// - config.validate()
    /// - 必須 collaborator が全て揃っているか
    pub fn build(self) -> Result<LootEngine, BuildError> {
        self.config.validate().map_err(BuildError::InvalidConfig)?;

        let mut missing = Vec::new();
        if self.source.is_none() {
            missing.push("item_source");
        }
        if self.metadata.is_none() {
            missing.push("metadata");
        }
        if self.rules.is_none() {
            missing.push("rule_store");
        }
        if self.probe.is_none() {
            missing.push("filter_probe");
        }
        if self.inventory.is_none() {
            missing.push("inventory");
        }
        if self.dispatcher.is_none() {
            missing.push("dispatcher");
        }
        if self.authority.is_none() {
            missing.push("authority");
        }

        let (
            Some(source),
            Some(metadata),
            Some(rules),
            Some(probe),
            Some(inventory),
            Some(dispatcher),
            Some(authority),
        ) = (
            self.source,
            self.metadata,
            self.rules,
            self.probe,
            self.inventory,
            self.dispatcher,
            self.authority,
        )
        else {
            return Err(BuildError::MissingCollaborators(missing));
        };

        let config = Arc::new(self.config);
        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids: Arc<dyn IdGenerator> = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(SystemClock)));
        let events = Arc::new(self.events);

        let filters = FilterEvaluator::new(probe, clock.clone(), &config);
        let resolver = DecisionResolver::new(rules, inventory, config.clone());
        let executor = Arc::new(CommandExecutor::new(dispatcher, ids.clone(), events.clone(), &config));

        tracing::debug!(handlers = events.len(), dry_run = config.dry_run, "engine built");
        Ok(LootEngine::assemble(
            config, source, metadata, authority, clock, ids, filters, resolver, executor, events,
        ))
    }
}
