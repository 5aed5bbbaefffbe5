//! In-memory result cache for durations and frame colors.
//!
//! Entries expire after a TTL and the cache never holds more than
//! `max_entries` live entries. When a new key arrives at capacity, expired
//! entries are purged first and then the oldest-inserted entry is evicted.
//! Rewriting a key counts as a fresh insertion.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use framehue_models::{CacheStats, Rgb};
use tokio::time::Instant;
use tracing::debug;

use crate::metrics::record_cache_lookup;

/// Cache key. Renders as `duration:{locator}` or `color:{locator}:{timestamp}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Duration(String),
    Color { locator: String, timestamp: u64 },
}

impl CacheKey {
    pub fn duration(locator: impl Into<String>) -> Self {
        Self::Duration(locator.into())
    }

    pub fn color(locator: impl Into<String>, timestamp: u64) -> Self {
        Self::Color {
            locator: locator.into(),
            timestamp,
        }
    }

    pub fn locator(&self) -> &str {
        match self {
            Self::Duration(locator) | Self::Color { locator, .. } => locator,
        }
    }

    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Duration(_) => "duration",
            Self::Color { .. } => "color",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duration(locator) => write!(f, "duration:{}", locator),
            Self::Color { locator, timestamp } => write!(f, "color:{}:{}", locator, timestamp),
        }
    }
}

/// Cached value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheValue {
    DurationMs(u64),
    Color(Rgb),
}

/// Cache configuration.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            max_entries: 10_000,
        }
    }
}

struct Entry {
    value: CacheValue,
    expires_at: Instant,
    seq: u64,
}

#[derive(Default)]
struct State {
    entries: HashMap<CacheKey, Entry>,
    /// Insertion order; stale records are skipped on eviction.
    order: VecDeque<(u64, CacheKey)>,
    next_seq: u64,
    hits: u64,
    misses: u64,
}

impl State {
    fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.expires_at > now);
        before - self.entries.len()
    }

    fn evict_oldest(&mut self) -> Option<CacheKey> {
        while let Some((seq, key)) = self.order.pop_front() {
            if self.entries.get(&key).is_some_and(|e| e.seq == seq) {
                self.entries.remove(&key);
                return Some(key);
            }
        }
        None
    }

    fn compact_order(&mut self) {
        if self.order.len() > self.entries.len() * 2 + 64 {
            let entries = &self.entries;
            self.order
                .retain(|(seq, key)| entries.get(key).is_some_and(|e| e.seq == *seq));
        }
    }
}

/// Thread-safe TTL cache shared by all extraction requests.
pub struct ResultCache {
    config: CacheConfig,
    state: Mutex<State>,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl ResultCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config: CacheConfig {
                max_entries: config.max_entries.max(1),
                ..config
            },
            state: Mutex::new(State::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a live entry. Expired entries are dropped and count as misses.
    pub fn get(&self, key: &CacheKey) -> Option<CacheValue> {
        let now = Instant::now();
        let mut state = self.lock();

        let found = state
            .entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value);

        if found.is_some() {
            state.hits += 1;
        } else {
            state.entries.remove(key);
            state.misses += 1;
        }
        drop(state);

        record_cache_lookup(key.namespace(), found.is_some());
        found
    }

    /// Store a value with the default TTL.
    pub fn set(&self, key: CacheKey, value: CacheValue) {
        self.set_with_ttl(key, value, self.config.ttl);
    }

    /// Store a value with an explicit TTL.
    pub fn set_with_ttl(&self, key: CacheKey, value: CacheValue, ttl: Duration) {
        let now = Instant::now();
        let mut state = self.lock();

        if !state.entries.contains_key(&key) && state.entries.len() >= self.config.max_entries {
            let purged = state.purge_expired(now);
            while state.entries.len() >= self.config.max_entries {
                match state.evict_oldest() {
                    Some(evicted) => debug!(key = %evicted, "Evicted cache entry"),
                    None => break,
                }
            }
            if purged > 0 {
                debug!(purged, "Purged expired cache entries");
            }
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.order.push_back((seq, key.clone()));
        state.entries.insert(
            key,
            Entry {
                value,
                expires_at: now + ttl,
                seq,
            },
        );
        state.compact_order();
    }

    /// Remove one entry. Returns whether it was present.
    pub fn delete(&self, key: &CacheKey) -> bool {
        self.lock().entries.remove(key).is_some()
    }

    /// Remove every entry for a locator, in both namespaces.
    pub fn delete_locator(&self, locator: &str) -> usize {
        let mut state = self.lock();
        let before = state.entries.len();
        state.entries.retain(|key, _| key.locator() != locator);
        before - state.entries.len()
    }

    /// Remove all entries and return how many live entries were dropped.
    ///
    /// Hit and miss counters are kept.
    pub fn clear(&self) -> usize {
        let now = Instant::now();
        let mut state = self.lock();
        state.purge_expired(now);
        let removed = state.entries.len();
        state.entries.clear();
        state.order.clear();
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let mut state = self.lock();
        state.purge_expired(now);
        CacheStats::new(state.entries.len(), state.hits, state.misses)
    }

    pub fn get_duration(&self, locator: &str) -> Option<u64> {
        match self.get(&CacheKey::duration(locator)) {
            Some(CacheValue::DurationMs(ms)) => Some(ms),
            _ => None,
        }
    }

    pub fn set_duration(&self, locator: &str, duration_ms: u64) {
        self.set(CacheKey::duration(locator), CacheValue::DurationMs(duration_ms));
    }

    pub fn get_color(&self, locator: &str, timestamp: u64) -> Option<Rgb> {
        match self.get(&CacheKey::color(locator, timestamp)) {
            Some(CacheValue::Color(color)) => Some(color),
            _ => None,
        }
    }

    pub fn set_color(&self, locator: &str, timestamp: u64, color: Rgb) {
        self.set(CacheKey::color(locator, timestamp), CacheValue::Color(color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(ttl_secs: u64, max_entries: usize) -> ResultCache {
        ResultCache::new(CacheConfig {
            ttl: Duration::from_secs(ttl_secs),
            max_entries,
        })
    }

    #[test]
    fn test_key_format() {
        assert_eq!(CacheKey::duration("v1").to_string(), "duration:v1");
        assert_eq!(CacheKey::color("v1", 500).to_string(), "color:v1:500");
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let cache = cache(10, 100);
        cache.set_duration("v1", 9000);
        assert_eq!(cache.get_duration("v1"), Some(9000));

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(cache.get_duration("v1"), None);

        let stats = cache.stats();
        assert_eq!((stats.entries, stats.hits, stats.misses), (0, 1, 1));
        assert_eq!(stats.hit_rate, 0.5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evicts_oldest_at_capacity() {
        let cache = cache(60, 2);
        cache.set_color("v1", 0, Rgb::new(1, 1, 1));
        cache.set_color("v1", 1, Rgb::new(2, 2, 2));
        // Rewriting moves the key to the back of the order.
        cache.set_color("v1", 0, Rgb::new(3, 3, 3));
        cache.set_color("v1", 2, Rgb::new(4, 4, 4));

        assert_eq!(cache.get_color("v1", 1), None);
        assert_eq!(cache.get_color("v1", 0), Some(Rgb::new(3, 3, 3)));
        assert_eq!(cache.get_color("v1", 2), Some(Rgb::new(4, 4, 4)));
        assert_eq!(cache.stats().entries, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_purged_before_eviction() {
        let cache = cache(60, 2);
        cache.set_with_ttl(CacheKey::duration("old"), CacheValue::DurationMs(1), Duration::from_secs(1));
        cache.set_duration("keep", 2);

        tokio::time::advance(Duration::from_secs(2)).await;
        cache.set_duration("new", 3);

        assert_eq!(cache.get_duration("keep"), Some(2));
        assert_eq!(cache.get_duration("new"), Some(3));
    }

    #[tokio::test]
    async fn test_clear_and_delete() {
        let cache = cache(60, 100);
        cache.set_duration("v1", 1000);
        cache.set_color("v1", 0, Rgb::new(0, 0, 0));
        cache.set_color("v2", 0, Rgb::new(0, 0, 0));

        assert!(cache.delete(&CacheKey::color("v2", 0)));
        assert!(!cache.delete(&CacheKey::color("v2", 0)));
        cache.set_color("v2", 5, Rgb::new(0, 0, 0));

        assert_eq!(cache.delete_locator("v1"), 2);
        assert_eq!(cache.clear(), 1);
        assert_eq!(cache.clear(), 0);
        assert_eq!(cache.get_color("v2", 5), None);
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_empty_stats() {
        let stats = ResultCache::default().stats();
        assert_eq!(stats.hit_rate, 0.0);
        assert_eq!(stats.entries, 0);
    }
}
