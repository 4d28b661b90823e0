//! Bounded LRU cache with optional TTL.
//!
//! Backs the geocode, current and forecast caches. Entries are evicted
//! least-recently-used once `max_size` is reached; when a TTL is set,
//! expired entries are dropped on read.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Thread-safe LRU cache keyed by string.
pub struct TtlCache<V> {
    inner: Mutex<CacheInner<V>>,
}

struct CacheInner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    order: Vec<String>,
    max_size: usize,
    ttl: Option<Duration>,
}

impl<V> CacheInner<V> {
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            let key = self.order.remove(pos);
            self.order.push(key);
        }
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.order.retain(|k| k != key);
    }
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache holding at most `max_size` entries. `ttl: None` never expires.
    pub fn new(max_size: usize, ttl: Option<Duration>) -> Self {
        let max_size = max_size.max(1);
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::with_capacity(max_size),
                order: Vec::with_capacity(max_size),
                max_size,
                ttl,
            }),
        }
    }

    /// Get a cached value. Returns None on miss or expired entry.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.lock();
        let ttl = inner.ttl;

        let (value, expired) = match inner.entries.get(key) {
            Some(entry) => (
                entry.value.clone(),
                ttl.is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl),
            ),
            None => return None,
        };

        if expired {
            inner.remove(key);
            return None;
        }
        inner.touch(key);
        Some(value)
    }

    /// Insert or refresh a value, evicting the least recently used entry at capacity.
    pub fn put(&self, key: String, value: V) {
        let mut inner = self.inner.lock();

        if inner.entries.contains_key(&key) {
            inner.touch(&key);
        } else {
            while inner.entries.len() >= inner.max_size && !inner.order.is_empty() {
                let oldest = inner.order.remove(0);
                inner.entries.remove(&oldest);
            }
            inner.order.push(key.clone());
        }

        inner.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }
}
