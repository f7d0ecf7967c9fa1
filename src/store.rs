use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::key::StoreKey;
use crate::stats::StoreStats;
use crate::timed_map::BoundedTimedMap;

/// A named, synchronized cache store.
///
/// Wraps one [`BoundedTimedMap`] behind a single mutex, the store's monitor
/// lock. Every public operation acquires it, so operations on one store are
/// strictly one at a time and linearizable; there is no atomicity across
/// different stores. On top of the engine the store adds identity (`user`,
/// `store_name`), a deferred-close flag, and hit/attempt counters.
///
/// # Deferred close
///
/// [`close`](Store::close) only raises a flag. The store stays fully usable
/// and keeps its entries; actual removal happens when a
/// [`Registry`](crate::Registry) sweep observes the flag, folds the store's
/// counters into the registry's carried-over totals, and drops it.
///
/// # Sliding TTL
///
/// Inherited from the engine: both `put` and a successful `get` reset an
/// entry's age. An entry that is read at least once per TTL interval lives
/// forever.
///
/// # Examples
///
/// ```
/// use cachestore::Store;
///
/// let store: Store<String> = Store::new(Some("alice"), "sessions", 64, 120);
///
/// store.put_str("token", Some("abc123".to_string()));
/// assert_eq!(store.get_str("token"), Some("abc123".to_string()));
/// assert_eq!(store.get_str("other"), None);
///
/// assert_eq!(store.attempt_count(), 2);
/// assert_eq!(store.found_count(), 1);
/// assert!((store.performance() - 50.0).abs() < f64::EPSILON);
/// ```
pub struct Store<V> {
    user: Option<String>,
    store_name: String,
    max_size: usize,
    ttl_secs: u64,
    closing: AtomicBool,
    stats: StoreStats,
    map: Mutex<BoundedTimedMap<V>>,
}

impl<V: Clone> Store<V> {
    /// Creates a store bounded by `max_size` entries and `ttl_secs` of idle
    /// age, timed by a [`SystemClock`].
    pub fn new(user: Option<&str>, store_name: &str, max_size: usize, ttl_secs: u64) -> Self {
        Self::with_clock(
            user,
            store_name,
            max_size,
            ttl_secs,
            Arc::new(SystemClock::new()),
        )
    }

    /// Creates a store with an injected clock, for deterministic tests.
    pub fn with_clock(
        user: Option<&str>,
        store_name: &str,
        max_size: usize,
        ttl_secs: u64,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user: user.map(str::to_string),
            store_name: store_name.to_string(),
            max_size,
            ttl_secs,
            closing: AtomicBool::new(false),
            stats: StoreStats::new(),
            map: Mutex::new(BoundedTimedMap::with_clock(
                max_size,
                ttl_secs.saturating_mul(1_000),
                clock,
            )),
        }
    }

    /// The owning user, if any.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// The store's name.
    pub fn store_name(&self) -> &str {
        self.store_name.as_str()
    }

    /// Marks the store as closing. Nothing is removed here; the registry
    /// sweep removes the store once it observes the flag.
    pub fn close(&self) {
        self.closing.store(true, Ordering::Relaxed);
        debug!(store = %self.store_name, "store marked closing");
    }

    /// Whether [`close`](Store::close) has been called.
    pub fn is_closing(&self) -> bool {
        self.closing.load(Ordering::Relaxed)
    }

    /// Inserts `value` under `key`.
    ///
    /// A `None` value is a silent no-op: nothing is stored, nothing is
    /// removed, no error is raised. An existing entry under `key` survives
    /// untouched.
    pub fn put(&self, key: StoreKey, value: Option<V>) {
        let Some(value) = value else {
            return;
        };
        self.map.lock().put(key, value);
    }

    /// [`put`](Store::put) with a bare string, wrapped as a single-part key.
    pub fn put_str(&self, key: &str, value: Option<V>) {
        self.put(StoreKey::single(key), value);
    }

    /// Looks up `key`.
    ///
    /// Counts one attempt unconditionally and one hit when the key is
    /// present and fresh. A hit also refreshes the entry's LRU position and
    /// TTL clock.
    pub fn get(&self, key: &StoreKey) -> Option<V> {
        self.stats.record_attempt();
        let value = self.map.lock().get(key);
        if value.is_some() {
            self.stats.record_found();
        }
        value
    }

    /// [`get`](Store::get) with a bare string, wrapped as a single-part key.
    pub fn get_str(&self, key: &str) -> Option<V> {
        self.get(&StoreKey::single(key))
    }

    /// Whether `key` is present and fresh. Not counted as an attempt and not
    /// a touch.
    pub fn contains_key(&self, key: &StoreKey) -> bool {
        self.map.lock().contains_key(key)
    }

    /// Removes `key`, returning its value if it was present and fresh.
    pub fn remove(&self, key: &StoreKey) -> Option<V> {
        self.map.lock().remove(key)
    }

    /// Runs the expiry scan now, returning the number of entries removed.
    ///
    /// Expiry is otherwise lazy: it runs at the start of every store
    /// operation, so this is only needed to reclaim memory during idle
    /// periods (the registry sweep calls it on every registered store).
    pub fn remove_expired(&self) -> usize {
        self.map.lock().expire_stale()
    }

    /// Drops every entry. Identity, counters, and the closing flag are
    /// untouched.
    pub fn clear(&self) {
        self.map.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.map.lock().is_empty()
    }

    /// Number of live entries.
    pub fn size(&self) -> usize {
        self.map.lock().len()
    }

    /// The size bound.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// The idle age bound in seconds.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Live keys in touch order, least recently used first.
    pub fn key_set(&self) -> Vec<StoreKey> {
        self.map.lock().keys()
    }

    /// Total lookups, hit or miss.
    pub fn attempt_count(&self) -> u64 {
        self.stats.attempts()
    }

    /// Total hits.
    pub fn found_count(&self) -> u64 {
        self.stats.found()
    }

    /// Hit percentage in `[0, 100]`; `0.0` before the first attempt.
    pub fn performance(&self) -> f64 {
        self.stats.performance()
    }
}

impl<V: Clone + PartialEq> Store<V> {
    /// Whether any live entry holds `value`.
    pub fn contains_value(&self, value: &V) -> bool {
        self.map.lock().contains_value(value)
    }
}

/// Two stores are equal iff they share `ttl_secs`, `max_size`, `store_name`,
/// and structurally equal contents (same key→value pairs, timestamps
/// ignored).
///
/// Comparing locks `self`'s map and then `other`'s; comparing the same pair
/// concurrently from two threads in opposite orders can deadlock, consistent
/// with the one-lock-per-store model which promises nothing across stores.
impl<V: Clone + PartialEq> PartialEq for Store<V> {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if self.ttl_secs != other.ttl_secs
            || self.max_size != other.max_size
            || self.store_name != other.store_name
        {
            return false;
        }
        let mine = self.map.lock();
        let theirs = other.map.lock();
        *mine == *theirs
    }
}

impl<V> fmt::Display for Store<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Store[{}{}, max_size={}, ttl={}s]",
            self.user.as_deref().map(|u| format!("{}:", u)).unwrap_or_default(),
            self.store_name,
            self.max_size,
            self.ttl_secs,
        )
    }
}

impl<V> fmt::Debug for Store<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("user", &self.user)
            .field("store_name", &self.store_name)
            .field("max_size", &self.max_size)
            .field("ttl_secs", &self.ttl_secs)
            .field("closing", &self.closing.load(Ordering::Relaxed))
            .finish()
    }
}
