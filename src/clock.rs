use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A monotonic millisecond time source.
///
/// The cache never reads the system time directly; every component that needs
/// "now" asks a `Clock`. Production code uses [`SystemClock`], tests inject a
/// [`ManualClock`] and advance it explicitly, which makes TTL behavior fully
/// deterministic without sleeping.
///
/// Implementations must be monotonic: successive calls to `now_millis` on the
/// same clock never go backwards.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds.
    fn now_millis(&self) -> u64;
}

/// Monotonic clock measuring milliseconds since the clock was created.
///
/// Backed by [`Instant`], so it is immune to wall-clock adjustments. The
/// absolute values are meaningless across clocks; only differences matter,
/// and the cache only ever computes differences.
///
/// # Examples
///
/// ```
/// use cachestore::{Clock, SystemClock};
///
/// let clock = SystemClock::new();
/// let a = clock.now_millis();
/// let b = clock.now_millis();
/// assert!(b >= a);
/// ```
#[derive(Debug)]
pub struct SystemClock {
    anchor: Instant,
}

impl SystemClock {
    /// Creates a clock anchored at the current instant.
    pub fn new() -> Self {
        Self {
            anchor: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        self.anchor.elapsed().as_millis() as u64
    }
}

/// A clock that only moves when told to.
///
/// Intended for tests: inject one into a store or registry, then `advance`
/// it past the TTL instead of sleeping.
///
/// # Examples
///
/// ```
/// use cachestore::{Clock, ManualClock};
///
/// let clock = ManualClock::new(0);
/// assert_eq!(clock.now_millis(), 0);
///
/// clock.advance(1_500);
/// assert_eq!(clock.now_millis(), 1_500);
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Creates a clock frozen at `start_millis`.
    pub fn new(start_millis: u64) -> Self {
        Self {
            now: AtomicU64::new(start_millis),
        }
    }

    /// Moves the clock forward by `millis`.
    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }
}
