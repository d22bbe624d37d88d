//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryRuleStore**: HashMap によるルールストレージ
//! - **StaticMetadata**: 固定テーブルのアイテム情報
//! - **ScriptedLootWindow / StaticFilterProbe / StaticInventory / FixedAuthority**: 手で書き換えるクライアント状態
//! - **SimulatedClient**: コマンドを受けて遅延後に確認を返すクライアント
//! - **RecordingHandler / TracingEventHandler**: イベントハンドラ
//!
//! # 本番用実装
//! 実際のゲームクライアントへの接続は別クレートに置きます。

pub mod game_state;
pub mod handlers;
pub mod metadata;
pub mod rule_store;
pub mod simulated_client;

pub use self::game_state::{FixedAuthority, ScriptedLootWindow, StaticFilterProbe, StaticInventory};
pub use self::handlers::{RecordingHandler, TracingEventHandler};
pub use self::metadata::StaticMetadata;
pub use self::rule_store::InMemoryRuleStore;
pub use self::simulated_client::{ClientDriver, ConfirmMode, IssuedCommand, SimulatedClient};
