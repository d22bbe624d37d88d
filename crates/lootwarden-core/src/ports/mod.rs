//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」です。エンジンが外部（ゲームクライアント、
//! ルールストレージ、アイテム DB）に求める契約だけを定義します。
//! 開発・テスト用の実装は `impls` にあります。

pub mod clock;
pub mod dispatch;
pub mod id_generator;
pub mod loot_source;
pub mod rule_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::dispatch::{Command, CommandDispatcher, Confirmation};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::loot_source::{FilterProbe, Inventory, ItemSource, PrimaryDecider};
pub use self::rule_store::{MetadataProvider, RuleStore};
