//! End-to-end tests for the combined LRU + sliding-TTL eviction behavior
//! observed through a `Store`.

use std::sync::Arc;

use cachestore::{ManualClock, Store, StoreKey};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn store_with_clock(max_size: usize, ttl_secs: u64) -> (Store<i32>, Arc<ManualClock>) {
    init_tracing();
    let clock = Arc::new(ManualClock::new(0));
    let store = Store::with_clock(None, "eviction", max_size, ttl_secs, clock.clone());
    (store, clock)
}

#[test]
fn test_size_bound_holds_after_every_put() {
    let (store, _clock) = store_with_clock(4, 3_600);

    for i in 0..100 {
        store.put_str(&format!("k{}", i), Some(i));
        assert!(store.size() <= 4);
    }
}

#[test]
fn test_lru_tie_break_without_access() {
    let (store, _clock) = store_with_clock(2, 3_600);

    store.put_str("a", Some(1));
    store.put_str("b", Some(2));
    store.put_str("c", Some(3));

    // "a" was least recently used
    assert!(!store.contains_key(&StoreKey::single("a")));
    assert!(store.contains_key(&StoreKey::single("b")));
    assert!(store.contains_key(&StoreKey::single("c")));
}

#[test]
fn test_lru_tie_break_with_access() {
    let (store, _clock) = store_with_clock(2, 3_600);

    store.put_str("a", Some(1));
    store.put_str("b", Some(2));
    store.get_str("a");
    store.put_str("c", Some(3));

    // The get promoted "a", so "b" became the victim
    assert!(store.contains_key(&StoreKey::single("a")));
    assert!(!store.contains_key(&StoreKey::single("b")));
    assert!(store.contains_key(&StoreKey::single("c")));
}

#[test]
fn test_sliding_ttl_touch_resets_the_clock() {
    let (store, clock) = store_with_clock(8, 1); // 1 second TTL

    store.put_str("a", Some(1));

    clock.advance(600);
    assert_eq!(store.get_str("a"), Some(1)); // touch at 600ms

    clock.advance(600);
    // 1_200ms since insertion, past the TTL, but only 600ms since the touch
    assert_eq!(store.get_str("a"), Some(1));
}

#[test]
fn test_idle_entry_expires() {
    let (store, clock) = store_with_clock(8, 1);

    store.put_str("a", Some(1));
    clock.advance(1_001);

    assert_eq!(store.get_str("a"), None);
    assert!(store.is_empty());
}

#[test]
fn test_expiry_boundary_is_strict() {
    let (store, clock) = store_with_clock(8, 1);

    store.put_str("a", Some(1));
    clock.advance(1_000);

    // age == ttl is not expired
    assert!(store.contains_key(&StoreKey::single("a")));
}

#[test]
fn test_no_read_path_observes_a_stale_entry() {
    let (store, clock) = store_with_clock(8, 1);

    store.put_str("a", Some(1));
    store.put_str("b", Some(2));
    clock.advance(1_001);

    assert_eq!(store.size(), 0);
    assert!(store.is_empty());
    assert!(!store.contains_key(&StoreKey::single("a")));
    assert!(!store.contains_value(&2));
    assert!(store.key_set().is_empty());
    assert_eq!(store.remove(&StoreKey::single("b")), None);
}

#[test]
fn test_expiry_is_lazy_until_observed() {
    let (store, clock) = store_with_clock(8, 1);

    store.put_str("a", Some(1));
    clock.advance(10_000);

    // Nothing has looked at the store since the TTL passed; the first
    // operation that does performs the removal and reports it.
    assert_eq!(store.remove_expired(), 1);
    assert_eq!(store.remove_expired(), 0);
}

#[test]
fn test_mixed_pressure_expiry_and_lru() {
    let (store, clock) = store_with_clock(3, 1);

    store.put_str("a", Some(1));
    store.put_str("b", Some(2));
    clock.advance(800);
    store.put_str("c", Some(3));

    clock.advance(300); // a, b now stale (1_100ms), c fresh (300ms)
    store.put_str("d", Some(4));

    // The stale pair went first; no LRU eviction was needed for "d"
    assert_eq!(store.size(), 2);
    assert!(store.contains_key(&StoreKey::single("c")));
    assert!(store.contains_key(&StoreKey::single("d")));
}

#[test]
fn test_concurrent_puts_and_gets_hold_invariants() {
    use std::thread;

    init_tracing();
    let store = Arc::new(Store::<i32>::new(None, "threads", 16, 3_600));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..500 {
                    store.put_str(&format!("t{}-{}", t, i), Some(i));
                    let _ = store.get_str(&format!("t{}-{}", t, i));
                    assert!(store.size() <= 16);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(store.size() <= 16);
    assert_eq!(store.attempt_count(), 8 * 500);
}
