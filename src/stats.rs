use std::sync::atomic::{AtomicU64, Ordering};

/// Hit/attempt counters for one store.
///
/// Counters are atomic with `Relaxed` ordering: cheap to bump on every
/// lookup, consistent enough for monitoring. An *attempt* is any `get`,
/// hit or miss; *found* counts only the hits.
///
/// # Examples
///
/// ```
/// use cachestore::StoreStats;
///
/// let stats = StoreStats::new();
/// stats.record_attempt();
/// stats.record_attempt();
/// stats.record_found();
///
/// assert_eq!(stats.attempts(), 2);
/// assert_eq!(stats.found(), 1);
/// assert!((stats.performance() - 50.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Default)]
pub struct StoreStats {
    attempts: AtomicU64,
    found: AtomicU64,
}

impl StoreStats {
    /// Creates counters at zero.
    pub fn new() -> Self {
        Self {
            attempts: AtomicU64::new(0),
            found: AtomicU64::new(0),
        }
    }

    /// Records a lookup, hit or miss.
    #[inline]
    pub fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a successful lookup.
    #[inline]
    pub fn record_found(&self) {
        self.found.fetch_add(1, Ordering::Relaxed);
    }

    /// Total lookups so far.
    #[inline]
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Total hits so far.
    #[inline]
    pub fn found(&self) -> u64 {
        self.found.load(Ordering::Relaxed)
    }

    /// Hit percentage in `[0, 100]`; `0.0` when nothing was attempted.
    pub fn performance(&self) -> f64 {
        hit_percentage(self.found(), self.attempts())
    }

    /// Resets both counters to zero.
    pub fn reset(&self) {
        self.attempts.store(0, Ordering::Relaxed);
        self.found.store(0, Ordering::Relaxed);
    }
}

impl Clone for StoreStats {
    fn clone(&self) -> Self {
        Self {
            attempts: AtomicU64::new(self.attempts()),
            found: AtomicU64::new(self.found()),
        }
    }
}

/// Snapshot of registry-wide access counters.
///
/// `live_*` sums the counters of every store currently registered;
/// `removed_*` carries the totals of stores that were swept after closing,
/// so statistics survive a store's removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessCount {
    pub live_attempts: u64,
    pub live_hits: u64,
    pub removed_attempts: u64,
    pub removed_hits: u64,
}

impl AccessCount {
    /// Attempts across live and removed stores.
    pub fn total_attempts(&self) -> u64 {
        self.live_attempts + self.removed_attempts
    }

    /// Hits across live and removed stores.
    pub fn total_hits(&self) -> u64 {
        self.live_hits + self.removed_hits
    }

    /// Hit percentage across live and removed stores; `0.0` with no
    /// attempts.
    pub fn performance(&self) -> f64 {
        hit_percentage(self.total_hits(), self.total_attempts())
    }
}

fn hit_percentage(hits: u64, attempts: u64) -> f64 {
    if attempts == 0 {
        0.0
    } else {
        100.0 * hits as f64 / attempts as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats_zeroed() {
        let stats = StoreStats::new();
        assert_eq!(stats.attempts(), 0);
        assert_eq!(stats.found(), 0);
        assert_eq!(stats.performance(), 0.0);
    }

    #[test]
    fn test_performance_two_thirds() {
        let stats = StoreStats::new();
        for _ in 0..3 {
            stats.record_attempt();
        }
        stats.record_found();
        stats.record_found();
        assert!((stats.performance() - 66.6666).abs() < 0.01);
    }

    #[test]
    fn test_reset() {
        let stats = StoreStats::new();
        stats.record_attempt();
        stats.record_found();
        stats.reset();
        assert_eq!(stats.attempts(), 0);
        assert_eq!(stats.found(), 0);
    }

    #[test]
    fn test_clone_is_independent() {
        let stats = StoreStats::new();
        stats.record_attempt();

        let snapshot = stats.clone();
        stats.record_attempt();

        assert_eq!(snapshot.attempts(), 1);
        assert_eq!(stats.attempts(), 2);
    }

    #[test]
    fn test_concurrent_recording() {
        use std::sync::Arc;
        use std::thread;

        let stats = Arc::new(StoreStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || {
                    for _ in 0..100 {
                        stats.record_attempt();
                    }
                    for _ in 0..25 {
                        stats.record_found();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.attempts(), 800);
        assert_eq!(stats.found(), 200);
        assert!((stats.performance() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_access_count_totals() {
        let count = AccessCount {
            live_attempts: 3,
            live_hits: 2,
            removed_attempts: 7,
            removed_hits: 3,
        };
        assert_eq!(count.total_attempts(), 10);
        assert_eq!(count.total_hits(), 5);
        assert!((count.performance() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_access_count_empty_performance() {
        assert_eq!(AccessCount::default().performance(), 0.0);
    }
}
