use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::entry::StoreEntry;
use crate::key::StoreKey;
use crate::recency::RecencyIndex;

/// The eviction engine: a map bounded by `max_size` with LRU eviction,
/// additionally expiring entries whose age strictly exceeds `ttl_ms`.
///
/// Entries live in a `HashMap` keyed by [`StoreKey`], with a [`RecencyIndex`]
/// tracking touch order alongside. Because a touch re-appends its key at the
/// newest position, one queue serves both decisions: its front is
/// simultaneously the LRU victim and the oldest-aged entry, so recency order
/// implies age order and the expiry scan can stop at the first survivor.
///
/// # Sliding TTL
///
/// The TTL is *sliding*, not absolute: every `put` **and every successful
/// `get`** refreshes the entry's clock, so an entry accessed more often than
/// the TTL elapses never expires. Callers expecting expiry at a fixed
/// interval from insertion must not rely on this type.
///
/// # Lazy expiry
///
/// There is no timer and no background thread. An expired entry stays in
/// memory until the next operation on the map observes and removes it;
/// every public operation runs [`expire_stale`](BoundedTimedMap::expire_stale)
/// before doing its own work, so no caller ever *observes* a stale entry
/// through any read path. The staleness window is bounded by the time to the
/// next access; that trade-off is part of this type's contract.
///
/// # Bounds
///
/// After any operation returns, `len() <= max_size` and no entry's age
/// strictly exceeds `ttl_ms`. A put that crosses the size bound evicts
/// exactly one victim, the least recently used entry; TTL expiry may remove
/// zero or many entries per call.
///
/// # Examples
///
/// ```
/// use cachestore::{BoundedTimedMap, StoreKey};
///
/// let mut map = BoundedTimedMap::new(2, 60_000);
/// map.put(StoreKey::single("a"), 1);
/// map.put(StoreKey::single("b"), 2);
///
/// // "a" becomes most recently used, so "b" is the next victim
/// map.get(&StoreKey::single("a"));
/// map.put(StoreKey::single("c"), 3);
///
/// assert_eq!(map.get(&StoreKey::single("a")), Some(1));
/// assert_eq!(map.get(&StoreKey::single("b")), None);
/// assert_eq!(map.get(&StoreKey::single("c")), Some(3));
/// ```
pub struct BoundedTimedMap<V> {
    entries: HashMap<StoreKey, StoreEntry<V>>,
    recency: RecencyIndex,
    max_size: usize,
    ttl_ms: u64,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> BoundedTimedMap<V> {
    /// Creates an engine bounded by `max_size` entries and `ttl_ms` of idle
    /// age, timed by a [`SystemClock`].
    pub fn new(max_size: usize, ttl_ms: u64) -> Self {
        Self::with_clock(max_size, ttl_ms, Arc::new(SystemClock::new()))
    }

    /// Creates an engine with an injected clock, for deterministic tests.
    pub fn with_clock(max_size: usize, ttl_ms: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            recency: RecencyIndex::new(),
            max_size,
            ttl_ms,
            clock,
        }
    }

    /// Inserts or overwrites `key`, returning the previous value if any.
    ///
    /// Runs the expiry scan first, then touches the key (most recently used,
    /// age reset). If the insertion pushes the map past `max_size`, exactly
    /// one victim, the least recently used entry, is evicted after the
    /// insertion.
    pub fn put(&mut self, key: StoreKey, value: V) -> Option<V> {
        self.expire_stale();
        let now = self.recency.touch_clamped(&key, self.clock.now_millis());
        let previous = self
            .entries
            .insert(key, StoreEntry::new(value, now))
            .map(|entry| entry.value);
        if self.entries.len() > self.max_size {
            if let Some((victim, _)) = self.recency.remove_oldest() {
                self.entries.remove(&victim);
                debug!(key = %victim, max_size = self.max_size, "evicted least recently used entry");
            }
        }
        previous
    }

    /// Looks up `key`, returning a clone of its value.
    ///
    /// A hit counts as a touch: the entry becomes most recently used and its
    /// TTL clock resets (sliding expiration). A miss returns `None`, never an
    /// error.
    pub fn get(&mut self, key: &StoreKey) -> Option<V> {
        self.expire_stale();
        if !self.entries.contains_key(key) {
            return None;
        }
        let now = self.recency.touch_clamped(key, self.clock.now_millis());
        let entry = self.entries.get_mut(key)?;
        entry.touch(now);
        Some(entry.value.clone())
    }

    /// Removes `key`, returning its value if it was present and fresh.
    pub fn remove(&mut self, key: &StoreKey) -> Option<V> {
        self.expire_stale();
        let previous = self.entries.remove(key).map(|entry| entry.value);
        if previous.is_some() {
            self.recency.remove(key);
        }
        previous
    }

    /// Removes every entry whose age strictly exceeds the TTL, oldest first,
    /// stopping at the first survivor. Returns the count removed.
    ///
    /// Entries are scanned oldest-first; recency order implies age order, so
    /// the first non-expired entry ends the scan.
    pub fn expire_stale(&mut self) -> usize {
        let now = self.clock.now_millis();
        let mut removed = 0;
        loop {
            let stale = match self.recency.oldest() {
                Some((_, ts)) => now.saturating_sub(ts) > self.ttl_ms,
                None => false,
            };
            if !stale {
                break;
            }
            if let Some((key, _)) = self.recency.remove_oldest() {
                self.entries.remove(&key);
                removed += 1;
            }
        }
        if removed > 0 {
            trace!(removed, ttl_ms = self.ttl_ms, "expired stale entries");
        }
        removed
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    /// Number of live entries.
    pub fn len(&mut self) -> usize {
        self.expire_stale();
        self.entries.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Whether `key` is present and fresh. Does not count as a touch.
    pub fn contains_key(&mut self, key: &StoreKey) -> bool {
        self.expire_stale();
        self.entries.contains_key(key)
    }

    /// Live keys in touch order, least recently used first.
    pub fn keys(&mut self) -> Vec<StoreKey> {
        self.expire_stale();
        self.recency.keys().cloned().collect()
    }

    /// The size bound.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// The idle age bound in milliseconds.
    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }
}

impl<V: Clone + PartialEq> BoundedTimedMap<V> {
    /// Whether any live entry holds `value`. Does not count as a touch.
    pub fn contains_value(&mut self, value: &V) -> bool {
        self.expire_stale();
        self.entries.values().any(|entry| entry.value == *value)
    }
}

/// Structural equality: same key→value contents, regardless of timestamps,
/// recency order, bounds, or clock.
impl<V: PartialEq> PartialEq for BoundedTimedMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|(key, entry)| {
                other
                    .entries
                    .get(key)
                    .is_some_and(|o| o.value == entry.value)
            })
    }
}

impl<V> fmt::Debug for BoundedTimedMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedTimedMap")
            .field("len", &self.entries.len())
            .field("max_size", &self.max_size)
            .field("ttl_ms", &self.ttl_ms)
            .finish()
    }
}
