//! # Cachestore
//!
//! Named, in-process cache stores with a combined size-bounded (LRU) and
//! age-bounded (sliding TTL) eviction policy, accessed through composite
//! multi-part keys, under an application-owned registry with deferred
//! closing and aggregated hit/miss statistics.
//!
//! ## Features
//!
//! - **Composite keys**: Fixed-arity multi-part string keys with a total
//!   order, cached hashing, and an exact string round-trip form
//! - **Combined eviction**: One engine enforces both a size bound (LRU, one
//!   victim per crossing insert) and an idle-age bound (sliding TTL)
//! - **Named stores**: Each store carries identity, a deferred-close flag,
//!   and hit/attempt counters behind a single coarse lock
//! - **Registry**: Get-or-create by composite name, lazy sweeping of closing
//!   stores, statistics that survive store removal
//! - **Deterministic time**: Every component takes a substitutable
//!   millisecond [`Clock`], so TTL behavior is testable without sleeping
//!
//! ## Sliding TTL
//!
//! The TTL is sliding, not absolute: every `put` **and every successful
//! `get`** resets an entry's age. An entry accessed more often than its TTL
//! elapses never expires. This is a deliberate, load-bearing behavior of the
//! whole crate; see [`BoundedTimedMap`] for details.
//!
//! ## Lazy expiry
//!
//! No timers, no background threads: expired entries are removed by the next
//! operation that observes them. Read paths never *return* stale entries,
//! but an idle store holds its stale memory until something touches it (or a
//! registry call sweeps it).
//!
//! ## Quick Start
//!
//! ```rust
//! use cachestore::{Registry, StoreKey};
//!
//! let registry: Registry<String> = Registry::new();
//!
//! // Get-or-create a store: 64 entries, 120 second TTL
//! let store = registry.get_store_with_defaults(Some("alice"), "sessions");
//!
//! store.put(StoreKey::pair("web", "42"), Some("payload".to_string()));
//! assert_eq!(store.get(&StoreKey::pair("web", "42")), Some("payload".to_string()));
//!
//! // Hit/attempt accounting is aggregated across the registry
//! assert_eq!(registry.access_count().live_attempts, 1);
//! ```
//!
//! ## Module Organization
//!
//! - [`key`](StoreKey) - Composite multi-part keys
//! - [`recency`](RecencyIndex) - Touch-ordered key/timestamp index
//! - [`timed_map`](BoundedTimedMap) - The LRU + TTL eviction engine
//! - [`store`](Store) - Named, synchronized store façade
//! - [`registry`](Registry) - Application-owned store registry
//! - [`clock`](Clock) - Substitutable millisecond time source
//!
mod clock;
mod entry;
mod error;
mod key;
mod recency;
mod registry;
mod stats;
mod store;
mod timed_map;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::StoreEntry;
pub use error::{CacheError, Result};
pub use key::{StoreKey, DEFAULT_SEPARATOR};
pub use recency::RecencyIndex;
pub use registry::{Registry, DEFAULT_MAX_SIZE, DEFAULT_TTL_SECS};
pub use stats::{AccessCount, StoreStats};
pub use store::Store;
pub use timed_map::BoundedTimedMap;
