use std::collections::VecDeque;

use crate::error::{CacheError, Result};
use crate::key::StoreKey;

/// An insertion/touch-ordered index from key to timestamp.
///
/// Keys live in a queue with the oldest entry at the front and the newest at
/// the back. Touching an existing key removes it and re-appends it at the
/// back, so the queue stays sorted by touch time without ever comparing
/// timestamps. That sorted invariant is what lets
/// [`remove_before`](RecencyIndex::remove_before) and
/// [`remove_after`](RecencyIndex::remove_after) stop at the first entry that
/// fails the threshold, costing O(k) for k removed entries, and lets callers
/// peek the oldest and newest entries in O(1).
///
/// The invariant is enforced rather than assumed: a touch whose timestamp is
/// earlier than the current newest entry fails with
/// [`CacheError::TimestampRegression`] and mutates nothing.
///
/// # Examples
///
/// ```
/// use cachestore::{RecencyIndex, StoreKey};
///
/// let mut index = RecencyIndex::new();
/// index.touch(&StoreKey::single("a"), 10).unwrap();
/// index.touch(&StoreKey::single("b"), 20).unwrap();
///
/// // Re-touching "a" moves it to the newest position
/// index.touch(&StoreKey::single("a"), 30).unwrap();
/// assert_eq!(index.oldest().map(|(k, _)| k.to_joined()), Some("b".into()));
/// assert_eq!(index.newest().map(|(k, _)| k.to_joined()), Some("a".into()));
/// ```
#[derive(Debug, Default)]
pub struct RecencyIndex {
    queue: VecDeque<(StoreKey, u64)>,
}

impl RecencyIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Records a touch of `key` at `timestamp`.
    ///
    /// An existing key is removed and re-appended at the newest position; a
    /// new key is appended. Timestamps must be non-decreasing across calls.
    ///
    /// # Errors
    ///
    /// [`CacheError::TimestampRegression`] if `timestamp` is earlier than the
    /// timestamp of the current newest entry; the index is left unchanged.
    pub fn touch(&mut self, key: &StoreKey, timestamp: u64) -> Result<()> {
        if let Some((_, newest)) = self.queue.back() {
            if timestamp < *newest {
                return Err(CacheError::TimestampRegression {
                    timestamp,
                    newest: *newest,
                });
            }
        }
        self.append(key, timestamp);
        Ok(())
    }

    /// Touch with the timestamp clamped up to the current newest entry, so
    /// the sorted invariant holds by construction. Returns the timestamp
    /// actually recorded. Used by the eviction engine, whose clock is
    /// monotonic by contract.
    pub(crate) fn touch_clamped(&mut self, key: &StoreKey, timestamp: u64) -> u64 {
        let timestamp = match self.queue.back() {
            Some((_, newest)) => timestamp.max(*newest),
            None => timestamp,
        };
        self.append(key, timestamp);
        timestamp
    }

    fn append(&mut self, key: &StoreKey, timestamp: u64) {
        if let Some(pos) = self.queue.iter().position(|(k, _)| k == key) {
            self.queue.remove(pos);
        }
        self.queue.push_back((key.clone(), timestamp));
    }

    /// The least recently touched entry.
    pub fn oldest(&self) -> Option<(&StoreKey, u64)> {
        self.queue.front().map(|(k, ts)| (k, *ts))
    }

    /// The most recently touched entry.
    pub fn newest(&self) -> Option<(&StoreKey, u64)> {
        self.queue.back().map(|(k, ts)| (k, *ts))
    }

    /// Removes and returns the least recently touched entry.
    pub fn remove_oldest(&mut self) -> Option<(StoreKey, u64)> {
        self.queue.pop_front()
    }

    /// Removes and returns the most recently touched entry.
    pub fn remove_newest(&mut self) -> Option<(StoreKey, u64)> {
        self.queue.pop_back()
    }

    /// Removes `key` from the index. Returns whether it was present.
    pub fn remove(&mut self, key: &StoreKey) -> bool {
        if let Some(pos) = self.queue.iter().position(|(k, _)| k == key) {
            self.queue.remove(pos);
            true
        } else {
            false
        }
    }

    /// Removes every entry with a timestamp below `threshold` (at or below
    /// it when `inclusive`), scanning from the oldest end.
    ///
    /// Returns the removed keys in removal order, oldest first.
    pub fn remove_before(&mut self, threshold: u64, inclusive: bool) -> Vec<StoreKey> {
        let mut removed = Vec::new();
        loop {
            let hit = match self.queue.front() {
                Some((_, ts)) if inclusive => *ts <= threshold,
                Some((_, ts)) => *ts < threshold,
                None => false,
            };
            if !hit {
                break;
            }
            if let Some((key, _)) = self.queue.pop_front() {
                removed.push(key);
            }
        }
        removed
    }

    /// Removes every entry with a timestamp above `threshold` (at or above
    /// it when `inclusive`), scanning from the newest end.
    ///
    /// Returns the removed keys in removal order, newest first.
    pub fn remove_after(&mut self, threshold: u64, inclusive: bool) -> Vec<StoreKey> {
        let mut removed = Vec::new();
        loop {
            let hit = match self.queue.back() {
                Some((_, ts)) if inclusive => *ts >= threshold,
                Some((_, ts)) => *ts > threshold,
                None => false,
            };
            if !hit {
                break;
            }
            if let Some((key, _)) = self.queue.pop_back() {
                removed.push(key);
            }
        }
        removed
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &StoreKey) -> bool {
        self.queue.iter().any(|(k, _)| k == key)
    }

    /// Keys in touch order, oldest first.
    pub fn keys(&self) -> impl Iterator<Item = &StoreKey> + '_ {
        self.queue.iter().map(|(k, _)| k)
    }

    /// Number of indexed keys.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
