//! Decision - 1 アイテムに対するアクションの決定
//!
//! - **FilterEvaluator**: ループフィルタの問い合わせ（短い TTL でキャッシュ）
//! - **DecisionResolver**: filter → rule → heuristic の三段カスケード
//! - **WaterfallResolver**: `PassTo|...` ルールを 1 単位ずつ消費
//! - **DecisionCache**: session + item + filter 状態をキーにしたメモ化

pub mod cache;
pub mod filter;
pub mod heuristic;
pub mod resolver;
pub mod waterfall;

pub use self::cache::{DecisionCache, DecisionKey, TtlCache};
pub use self::filter::FilterEvaluator;
pub use self::heuristic::{Thresholds, default_action};
pub use self::resolver::DecisionResolver;
pub use self::waterfall::{PassLookup, WaterfallResolver};
