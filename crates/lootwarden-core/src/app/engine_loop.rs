//! EngineLoop - 定期的に tick を回すループ
//!
//! 1 タスクで tick を直列に実行します（tick 同士は重ならない）。
//! tick のエラーはログに残してループを続けます。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::engine::LootEngine;

/// Loop handle.
/// - `shutdown_tx` を drop してもループは止まる
/// - `shutdown_and_join()` で終了を待てる
pub struct EngineLoop {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<u64>,
}

impl EngineLoop {
    pub fn spawn(engine: Arc<LootEngine>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move { run(engine, interval, &mut shutdown_rx).await });
        Self { shutdown_tx, join }
    }

    /// Stop after the current tick. An in-flight command is not cancelled.
    pub fn request_shutdown(&self) {
        // ignore send error: the loop may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    /// Shutdown and wait. Returns the number of ticks run.
    pub async fn shutdown_and_join(self) -> u64 {
        self.request_shutdown();
        match self.join.await {
            Ok(ticks) => ticks,
            Err(e) => {
                tracing::warn!(error = %e, "engine loop task failed");
                0
            }
        }
    }
}

async fn run(engine: Arc<LootEngine>, interval: Duration, shutdown_rx: &mut watch::Receiver<bool>) -> u64 {
    let mut ticker = tokio::time::interval(interval);
    // 長い tick（コマンド待ち）の後にまとめて追いつかない
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks = 0;

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        tokio::select! {
            changed = shutdown_rx.changed() => {
                // sender が drop されたら止まる
                if changed.is_err() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        ticks += 1;
        match engine.tick().await {
            Ok(report) if report.errors > 0 => {
                tracing::warn!(errors = report.errors, "tick finished with item errors");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "tick failed"),
        }
    }

    tracing::info!(ticks, "engine loop stopped");
    ticks
}
