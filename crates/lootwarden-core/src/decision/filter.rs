//! Filter evaluator: which loot filter, if any, is active for a slot.

use std::sync::Arc;

use tokio::sync::Mutex;

use super::cache::TtlCache;
use crate::config::EngineConfig;
use crate::domain::{FilterKind, Result};
use crate::ports::{Clock, FilterProbe};

type ProbeKey = (u32, bool, FilterKind);

/// Queries the six filter flags in priority order.
///
/// Every (slot, shared, filter) answer is cached for a short TTL so a tick
/// loop over an open window does not hammer the actor. Entries only leave the
/// cache by expiring.
pub struct FilterEvaluator {
    probe: Arc<dyn FilterProbe>,
    clock: Arc<dyn Clock>,
    cache: Mutex<TtlCache<ProbeKey, bool>>,
}

impl FilterEvaluator {
    pub fn new(probe: Arc<dyn FilterProbe>, clock: Arc<dyn Clock>, config: &EngineConfig) -> Self {
        Self {
            probe,
            clock,
            cache: Mutex::new(TtlCache::new(config.filter_cache_ttl())),
        }
    }

    /// First active filter in [`FilterKind::PRIORITY`] order.
    pub async fn active_filter(&self, slot: u32, shared: bool) -> Result<Option<FilterKind>> {
        for kind in FilterKind::PRIORITY {
            if self.is_active(slot, shared, kind).await? {
                return Ok(Some(kind));
            }
        }
        Ok(None)
    }

    async fn is_active(&self, slot: u32, shared: bool, kind: FilterKind) -> Result<bool> {
        let key = (slot, shared, kind);
        if let Some(active) = self.cache.lock().await.get(&key, self.clock.now()) {
            return Ok(active);
        }

        // ロックを跨いで await しない
        let active = self.probe.is_active(slot, shared, kind).await?;
        self.cache.lock().await.insert(key, active, self.clock.now());
        Ok(active)
    }

    pub async fn cached_entries(&self) -> usize {
        self.cache.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::StaticFilterProbe;
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn returns_highest_priority_active_filter() {
        let probe = StaticFilterProbe::new();
        probe.set(2, false, FilterKind::Never).await;
        probe.set(2, false, FilterKind::Greed).await;
        let eval = FilterEvaluator::new(Arc::new(probe), Arc::new(clock()), &EngineConfig::default());

        assert_eq!(eval.active_filter(2, false).await.unwrap(), Some(FilterKind::Greed));
        assert_eq!(eval.active_filter(2, true).await.unwrap(), None);
    }

    #[tokio::test]
    async fn repeated_queries_within_ttl_hit_the_cache() {
        let probe = Arc::new(StaticFilterProbe::new());
        probe.set(0, false, FilterKind::Need).await;
        let clock = clock();
        let eval = FilterEvaluator::new(probe.clone(), Arc::new(clock.clone()), &EngineConfig::default());

        eval.active_filter(0, false).await.unwrap();
        let after_first = probe.query_count();

        // 変更しても TTL 内ならキャッシュされた値が返る
        probe.clear(0, false, FilterKind::Need).await;
        assert_eq!(eval.active_filter(0, false).await.unwrap(), Some(FilterKind::Need));
        assert_eq!(probe.query_count(), after_first);

        clock.advance(Duration::from_secs(5));
        assert_eq!(eval.active_filter(0, false).await.unwrap(), None);
        assert!(probe.query_count() > after_first);
    }
}
