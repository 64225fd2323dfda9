use std::hash::Hash;
use std::sync::Mutex;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

/// A cached value and the instant it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub stored_at: Instant,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
        }
    }

    /// Valid while `now - stored_at < ttl`.
    pub fn is_fresh_at(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// Concurrent key/value cache whose entries expire after a fixed TTL.
///
/// Backed by a sharded `DashMap` (one `RwLock` per shard), so concurrent
/// readers never block each other and a refresh swaps the whole entry under
/// the shard's write lock. Readers may observe the previous value while a
/// refresh is in flight, never a partially written one.
///
/// Keys that are never read again are swept out by `insert`, at most once
/// per TTL, so the map stays bounded by what was stored within roughly two
/// TTLs.
pub struct TtlCache<K, V> {
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
    last_sweep: Mutex<Instant>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    /// Return a clone of the value if present and fresh.
    ///
    /// An expired entry is evicted, unless a concurrent writer already
    /// replaced it with a fresh one.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if entry.is_fresh_at(now, self.ttl) {
                return Some(entry.value.clone());
            }
        }
        self.entries
            .remove_if(key, |_, entry| !entry.is_fresh_at(now, self.ttl));
        None
    }

    /// Store `value` with a fresh TTL, replacing any previous entry wholesale.
    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(key, CacheEntry::new(value));
        self.sweep_if_due();
    }

    /// Drop every expired entry, if a full TTL has passed since the last sweep.
    fn sweep_if_due(&self) {
        let now = Instant::now();
        {
            let Ok(mut last) = self.last_sweep.lock() else {
                return;
            };
            if now.saturating_duration_since(*last) < self.ttl {
                return;
            }
            *last = now;
        }
        self.entries.retain(|_, entry| entry.is_fresh_at(now, self.ttl));
    }

    /// Number of entries held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
