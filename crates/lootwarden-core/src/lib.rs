//! lootwarden-core
//!
//! Core building blocks for the lootwarden engine: decide what to do with
//! each item in a loot window and drive that decision through a
//! rate-limited, confirmation-gated command channel.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, item, action, filter, rule, decision, events, errors）
//! - **ports**: 抽象化レイヤー（ItemSource, RuleStore, CommandDispatcher, Clock, など）
//! - **decision**: filter 評価, waterfall, heuristic, 3 段階の resolver, decision cache
//! - **session**: session / processed-item tracker, no-drop wait timer
//! - **executor**: cooldown 付きの command executor（FIFO queue）
//! - **events**: ハンドラごとに隔離されたイベント配送
//! - **app**: LootEngine, EngineBuilder, EngineLoop, EngineStatus
//! - **impls**: 実装（開発用・テスト用）

pub mod app;
pub mod config;
pub mod decision;
pub mod domain;
pub mod events;
pub mod executor;
pub mod impls;
pub mod ports;
pub mod session;

pub use app::{BuildError, ClearReason, EngineBuilder, EngineLoop, EngineStatus, LootEngine, TickReport};
pub use config::EngineConfig;
pub use domain::{LootError, Result};
