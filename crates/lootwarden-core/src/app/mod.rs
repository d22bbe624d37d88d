//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **EngineBuilder**: エンジンの構築とワイヤリング
//! - **LootEngine**: tick（検出→判断→実行）の本体
//! - **EngineLoop**: 定期 tick ループ
//! - **EngineStatus**: 状態スナップショット

pub mod builder;
pub mod engine;
pub mod engine_loop;
pub mod status;

pub use self::builder::{BuildError, EngineBuilder};
pub use self::engine::{ClearReason, LootEngine};
pub use self::engine_loop::EngineLoop;
pub use self::status::{EngineStatus, TickReport};
