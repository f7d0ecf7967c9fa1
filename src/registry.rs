use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::stats::AccessCount;
use crate::store::Store;

/// Size bound used by [`Registry::get_store_with_defaults`].
pub const DEFAULT_MAX_SIZE: usize = 64;

/// TTL used by [`Registry::get_store_with_defaults`].
pub const DEFAULT_TTL_SECS: u64 = 120;

struct RegistryInner<V> {
    stores: HashMap<String, Arc<Store<V>>>,
    removed_attempts: u64,
    removed_hits: u64,
}

/// An application-owned registry of named [`Store`]s.
///
/// Stores are addressed by a composite name (`user:store_name` when a
/// non-blank user is given, `store_name` alone otherwise) and handed out as
/// `Arc`s, so repeated lookups with the same name return the same store.
///
/// The registry is an explicit object with whatever lifetime the application
/// gives it; create one and pass it where it is needed. There is no hidden
/// process-global instance.
///
/// # The sweep
///
/// Registry maintenance is piggy-backed on use rather than run on a timer:
/// every registry operation (except the pure lookup
/// [`get_existing_store`](Registry::get_existing_store)) first walks the
/// registered stores, expires their stale entries, and removes any store
/// whose closing flag is set, folding that store's attempt/hit counters
/// into the registry's carried-over totals so aggregated statistics survive
/// the removal. A closed store therefore remains registered, fully usable,
/// until the next sweeping call.
///
/// # Locking
///
/// One mutex serializes every registry operation; registry calls take it
/// first and then each store's own lock as the sweep visits it. Store
/// operations made directly on an `Arc<Store>` only take that store's lock
/// and never the registry's.
///
/// # Examples
///
/// ```
/// use cachestore::Registry;
///
/// let registry: Registry<String> = Registry::new();
///
/// let store = registry.get_store_with_defaults(Some("alice"), "sessions");
/// store.put_str("token", Some("abc".to_string()));
///
/// // Same composite name, same store
/// let again = registry
///     .get_store(Some("alice"), "sessions", 64, 120, false)
///     .unwrap();
/// assert!(std::sync::Arc::ptr_eq(&store, &again));
/// ```
pub struct Registry<V> {
    inner: Mutex<RegistryInner<V>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> Registry<V> {
    /// Creates an empty registry timed by a [`SystemClock`].
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    /// Creates an empty registry with an injected clock. Every store the
    /// registry creates shares this clock, so one substituted clock drives
    /// the whole tree deterministically.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                stores: HashMap::new(),
                removed_attempts: 0,
                removed_hits: 0,
            }),
            clock,
        }
    }

    /// Looks up the store for `user`/`store_name`, optionally creating it.
    ///
    /// Runs the sweep, then: an existing store is returned as-is (the
    /// `max_size`/`ttl_secs` arguments do not reconfigure it); an absent one
    /// is created and registered when `create_if_not_found` is set, and
    /// `None` is returned otherwise.
    pub fn get_store(
        &self,
        user: Option<&str>,
        store_name: &str,
        max_size: usize,
        ttl_secs: u64,
        create_if_not_found: bool,
    ) -> Option<Arc<Store<V>>> {
        let mut inner = self.inner.lock();
        inner.sweep();
        let name = composite_name(user, store_name);
        if let Some(store) = inner.stores.get(&name) {
            return Some(Arc::clone(store));
        }
        if !create_if_not_found {
            return None;
        }
        Some(self.register(&mut inner, name, user, store_name, max_size, ttl_secs))
    }

    /// Get-or-create with [`DEFAULT_MAX_SIZE`] and [`DEFAULT_TTL_SECS`].
    pub fn get_store_with_defaults(
        &self,
        user: Option<&str>,
        store_name: &str,
    ) -> Arc<Store<V>> {
        let mut inner = self.inner.lock();
        inner.sweep();
        let name = composite_name(user, store_name);
        if let Some(store) = inner.stores.get(&name) {
            return Arc::clone(store);
        }
        self.register(
            &mut inner,
            name,
            user,
            store_name,
            DEFAULT_MAX_SIZE,
            DEFAULT_TTL_SECS,
        )
    }

    /// Pure lookup: no sweep, no creation.
    ///
    /// This is the one registry call with no side effects, so a store that
    /// was closed but not yet swept is still returned here.
    pub fn get_existing_store(&self, user: Option<&str>, store_name: &str) -> Option<Arc<Store<V>>> {
        let inner = self.inner.lock();
        inner.stores.get(&composite_name(user, store_name)).cloned()
    }

    /// Whether a store is registered under `user`/`store_name`. Sweeps
    /// first, so a closed store reports `false`.
    pub fn store_exists(&self, user: Option<&str>, store_name: &str) -> bool {
        let mut inner = self.inner.lock();
        inner.sweep();
        inner.stores.contains_key(&composite_name(user, store_name))
    }

    /// Number of registered stores, after the sweep.
    pub fn store_count(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.sweep();
        inner.stores.len()
    }

    /// Composite names of all registered stores, after the sweep.
    pub fn store_names(&self) -> Vec<String> {
        let mut inner = self.inner.lock();
        inner.sweep();
        inner.stores.keys().cloned().collect()
    }

    /// Immediately unregisters the store, bypassing the closing protocol.
    ///
    /// The store's counters are NOT folded into the carried-over totals;
    /// that only happens when the sweep collects a closing store. Returns
    /// the removed store, which stays usable for anyone still holding it.
    pub fn remove_store(&self, user: Option<&str>, store_name: &str) -> Option<Arc<Store<V>>> {
        let mut inner = self.inner.lock();
        inner.sweep();
        inner.stores.remove(&composite_name(user, store_name))
    }

    /// Unregisters every store without folding any counters.
    pub fn remove_all_stores(&self) {
        let mut inner = self.inner.lock();
        inner.sweep();
        inner.stores.clear();
    }

    /// Aggregated access counters: live stores' current totals plus the
    /// carried-over totals of swept stores.
    pub fn access_count(&self) -> AccessCount {
        let mut inner = self.inner.lock();
        inner.sweep();
        let mut count = AccessCount {
            live_attempts: 0,
            live_hits: 0,
            removed_attempts: inner.removed_attempts,
            removed_hits: inner.removed_hits,
        };
        for store in inner.stores.values() {
            count.live_attempts += store.attempt_count();
            count.live_hits += store.found_count();
        }
        count
    }

    /// Hit percentage across live and swept stores; `0.0` with no attempts.
    pub fn performance(&self) -> f64 {
        self.access_count().performance()
    }

    fn register(
        &self,
        inner: &mut RegistryInner<V>,
        name: String,
        user: Option<&str>,
        store_name: &str,
        max_size: usize,
        ttl_secs: u64,
    ) -> Arc<Store<V>> {
        let store = Arc::new(Store::with_clock(
            user,
            store_name,
            max_size,
            ttl_secs,
            Arc::clone(&self.clock),
        ));
        debug!(store = %name, max_size, ttl_secs, "registered store");
        inner.stores.insert(name, Arc::clone(&store));
        store
    }
}

impl<V: Clone> RegistryInner<V> {
    /// Expires stale entries in every store and collects stores marked
    /// closing, folding their counters into the carried-over totals.
    fn sweep(&mut self) {
        let removed_attempts = &mut self.removed_attempts;
        let removed_hits = &mut self.removed_hits;
        self.stores.retain(|name, store| {
            store.remove_expired();
            if store.is_closing() {
                *removed_attempts += store.attempt_count();
                *removed_hits += store.found_count();
                debug!(store = %name, "swept closing store");
                false
            } else {
                true
            }
        });
    }
}

impl<V: Clone> Default for Registry<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// `trim(user) + ":" + store_name` when the user is non-blank, else the bare
/// store name.
fn composite_name(user: Option<&str>, store_name: &str) -> String {
    match user.map(str::trim) {
        Some(user) if !user.is_empty() => format!("{}:{}", user, store_name),
        _ => store_name.to_string(),
    }
}
