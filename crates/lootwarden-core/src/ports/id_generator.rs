//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: Clock ベースの ULID（本番・テスト共用）

use crate::domain::ids::{CommandId, SessionId};
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は session / command の ID を生成
///
/// `Send + Sync` を要求（executor と engine loop の両方から使う）
pub trait IdGenerator: Send + Sync {
    fn session_id(&self) -> SessionId;

    fn command_id(&self) -> CommandId;
}

/// UlidGenerator は Clock の時刻を timestamp 部分に使う
///
/// FixedClock を渡すと timestamp 部分は決定的になります
/// （random 部分があるので ID 自体は毎回異なる）。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn session_id(&self) -> SessionId {
        SessionId::from(self.next_ulid())
    }

    fn command_id(&self) -> CommandId {
        CommandId::from(self.next_ulid())
    }
}
