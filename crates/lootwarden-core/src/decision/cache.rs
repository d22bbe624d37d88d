//! TTL caches: the generic map and the decision cache built on it.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::{Decision, FilterKind, SessionId, filter_signature};
use crate::ports::clock::to_delta;

/// A map whose entries stop being visible at `inserted_at + ttl`.
///
/// Expired entries are dropped lazily on lookup, or in bulk with
/// [`TtlCache::purge_expired`].
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: HashMap<K, (V, DateTime<Utc>)>,
    ttl: TimeDelta,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl: to_delta(ttl),
        }
    }

    /// A hit is only returned strictly before `expires_at`.
    pub fn get(&mut self, key: &K, now: DateTime<Utc>) -> Option<V> {
        match self.entries.get(key) {
            Some((value, expires_at)) if now < *expires_at => Some(value.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&mut self, key: K, value: V, now: DateTime<Utc>) {
        let expires_at = now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries.insert(key, (value, expires_at));
    }

    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, (_, expires_at)| now < *expires_at);
        before - self.entries.len()
    }

    pub fn retain_keys(&mut self, mut keep: impl FnMut(&K) -> bool) {
        self.entries.retain(|k, _| keep(k));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Key of a memoized decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecisionKey {
    pub session: SessionId,
    pub item: String,
    pub shared: bool,
    pub filter: &'static str,
}

impl DecisionKey {
    pub fn new(session: SessionId, item: &str, shared: bool, filter: Option<FilterKind>) -> Self {
        Self {
            session,
            item: item.to_string(),
            shared,
            filter: filter_signature(filter),
        }
    }
}

/// Short-lived memo in front of the decision resolver.
///
/// Only bounds call volume; disabling it must not change any decision.
#[derive(Debug)]
pub struct DecisionCache {
    inner: TtlCache<DecisionKey, Decision>,
    enabled: bool,
    hits: u64,
    misses: u64,
}

impl DecisionCache {
    pub fn new(ttl: Duration, enabled: bool) -> Self {
        Self {
            inner: TtlCache::new(ttl),
            enabled,
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, key: &DecisionKey, now: DateTime<Utc>) -> Option<Decision> {
        if !self.enabled {
            return None;
        }
        let hit = self.inner.get(key, now);
        if hit.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        hit
    }

    pub fn insert(&mut self, key: DecisionKey, decision: Decision, now: DateTime<Utc>) {
        if self.enabled {
            self.inner.insert(key, decision, now);
        }
    }

    /// Forget every cached decision for one item (any session, any filter).
    pub fn invalidate_item(&mut self, item: &str) {
        self.inner.retain_keys(|k| k.item != item);
    }

    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        self.inner.purge_expired(now)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DecisionOrigin, LootAction};
    use chrono::TimeZone;
    use ulid::Ulid;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn keep() -> Decision {
        Decision::new(LootAction::Keep, DecisionOrigin::Rule)
    }

    #[test]
    fn ttl_cache_expires_exactly_at_deadline() {
        let mut cache = TtlCache::new(Duration::from_secs(5));
        cache.insert("k", 1, t0());

        assert_eq!(cache.get(&"k", t0() + TimeDelta::milliseconds(4999)), Some(1));
        assert_eq!(cache.get(&"k", t0() + TimeDelta::seconds(5)), None);
        // 期限切れのエントリは lookup 時に削除される
        assert!(cache.is_empty());
    }

    #[test]
    fn purge_drops_only_expired_entries() {
        let mut cache = TtlCache::new(Duration::from_secs(10));
        cache.insert("old", 1, t0());
        cache.insert("new", 2, t0() + TimeDelta::seconds(8));

        assert_eq!(cache.purge_expired(t0() + TimeDelta::seconds(12)), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn decision_cache_hits_within_ttl_and_misses_after() {
        let session = SessionId::from_ulid(Ulid::new());
        let key = DecisionKey::new(session, "Rusty Sword", false, None);
        let mut cache = DecisionCache::new(Duration::from_secs(30), true);

        assert_eq!(cache.get(&key, t0()), None);
        cache.insert(key.clone(), keep(), t0());
        assert_eq!(cache.get(&key, t0() + TimeDelta::seconds(29)), Some(keep()));
        assert_eq!(cache.get(&key, t0() + TimeDelta::seconds(30)), None);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn key_includes_filter_and_shared_flag() {
        let session = SessionId::from_ulid(Ulid::new());
        let mut cache = DecisionCache::new(Duration::from_secs(30), true);
        cache.insert(DecisionKey::new(session, "Gem", false, None), keep(), t0());

        assert_eq!(cache.get(&DecisionKey::new(session, "Gem", true, None), t0()), None);
        assert_eq!(
            cache.get(&DecisionKey::new(session, "Gem", false, Some(FilterKind::Greed)), t0()),
            None
        );
    }

    #[test]
    fn disabled_cache_never_hits() {
        let session = SessionId::from_ulid(Ulid::new());
        let key = DecisionKey::new(session, "Gem", false, None);
        let mut cache = DecisionCache::new(Duration::from_secs(30), false);

        cache.insert(key.clone(), keep(), t0());
        assert_eq!(cache.get(&key, t0()), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_item_drops_all_its_keys() {
        let session = SessionId::from_ulid(Ulid::new());
        let mut cache = DecisionCache::new(Duration::from_secs(30), true);
        cache.insert(DecisionKey::new(session, "Gem", false, None), keep(), t0());
        cache.insert(DecisionKey::new(session, "Gem", true, None), keep(), t0());
        cache.insert(DecisionKey::new(session, "Bone", false, None), keep(), t0());

        cache.invalidate_item("Gem");
        assert_eq!(cache.len(), 1);
    }
}
