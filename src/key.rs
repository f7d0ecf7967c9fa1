use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{CacheError, Result};

/// Separator used for string round-tripping when none is configured.
pub const DEFAULT_SEPARATOR: char = '|';

/// Internal part storage.
///
/// A single-part key stores its value directly instead of allocating a
/// one-element `Vec`. Behavior is identical to the general case with
/// arity 1; only the footprint differs.
#[derive(Debug, Clone)]
enum KeyParts {
    One(String),
    Many(Vec<String>),
}

impl KeyParts {
    fn arity(&self) -> usize {
        match self {
            KeyParts::One(_) => 1,
            KeyParts::Many(parts) => parts.len(),
        }
    }

    /// Part at `index`. Callers bounds-check first.
    fn at(&self, index: usize) -> &str {
        match self {
            KeyParts::One(part) => part,
            KeyParts::Many(parts) => &parts[index],
        }
    }

    /// Replaces the part at `index`. Callers bounds-check first.
    fn set(&mut self, index: usize, value: String) {
        match self {
            KeyParts::One(part) => *part = value,
            KeyParts::Many(parts) => parts[index] = value,
        }
    }
}

/// An ordered, fixed-arity sequence of string parts identifying a cached
/// value.
///
/// The part count is fixed at construction and never changes afterwards:
/// [`set_part`](StoreKey::set_part) replaces a part in place and
/// [`set_string`](StoreKey::set_string) re-fills the existing parts. A
/// configurable separator (default `|`) is used only for the string
/// round-trip form `part1|part2|...`; it takes no role in equality,
/// ordering, or hashing.
///
/// # Ordering
///
/// Keys are totally ordered: a key with fewer parts ranks below a key with
/// more parts, and keys of equal arity compare lexicographically by part,
/// left to right. `Option<StoreKey>` extends this with `None` below every
/// key, matching the convention that an absent key ranks lowest.
///
/// # Hashing
///
/// The hash is the XOR of each part's individual hash. It is computed lazily,
/// cached, and invalidated whenever a part mutates, so repeated map lookups
/// with the same key hash the parts only once.
///
/// # Examples
///
/// ```
/// use cachestore::StoreKey;
///
/// let mut key = StoreKey::pair("session", "42");
/// assert_eq!(key.arity(), 2);
/// assert_eq!(key.to_joined(), "session|42");
///
/// key.set_part(1, "43").unwrap();
/// assert_eq!(key.to_joined(), "session|43");
///
/// // Round trip through the string form
/// let mut other = StoreKey::pair("", "");
/// other.set_string(&key.to_joined()).unwrap();
/// assert_eq!(other, key);
/// ```
#[derive(Clone)]
pub struct StoreKey {
    parts: KeyParts,
    separator: char,
    cached_hash: Cell<Option<u64>>,
}

impl StoreKey {
    /// Creates a single-part key.
    ///
    /// # Examples
    ///
    /// ```
    /// use cachestore::StoreKey;
    ///
    /// let key = StoreKey::single("user:42");
    /// assert_eq!(key.arity(), 1);
    /// assert_eq!(key.part(0).unwrap(), "user:42");
    /// ```
    pub fn single(part: impl Into<String>) -> Self {
        Self {
            parts: KeyParts::One(part.into()),
            separator: DEFAULT_SEPARATOR,
            cached_hash: Cell::new(None),
        }
    }

    /// Creates a two-part key.
    pub fn pair(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            parts: KeyParts::Many(vec![first.into(), second.into()]),
            separator: DEFAULT_SEPARATOR,
            cached_hash: Cell::new(None),
        }
    }

    /// Creates a key from an ordered sequence of parts.
    ///
    /// Arity is the number of parts supplied. An empty sequence yields a
    /// single empty part, keeping the arity invariant `n >= 1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cachestore::StoreKey;
    ///
    /// let key = StoreKey::from_parts(["a", "b", "c"]);
    /// assert_eq!(key.arity(), 3);
    /// assert_eq!(key.to_joined(), "a|b|c");
    /// ```
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut collected: Vec<String> = parts.into_iter().map(Into::into).collect();
        let parts = match collected.len() {
            0 => KeyParts::One(String::new()),
            1 => KeyParts::One(collected.remove(0)),
            _ => KeyParts::Many(collected),
        };
        Self {
            parts,
            separator: DEFAULT_SEPARATOR,
            cached_hash: Cell::new(None),
        }
    }

    /// Creates a key by splitting `joined` on the default separator.
    ///
    /// Arity is the number of tokens found, so `"a|b"` yields a two-part key
    /// and `"a"` a single-part key.
    pub fn from_joined(joined: &str) -> Self {
        Self::from_joined_with(joined, DEFAULT_SEPARATOR)
    }

    /// Creates a key by splitting `joined` on `separator`, which the key
    /// keeps for later round trips.
    pub fn from_joined_with(joined: &str, separator: char) -> Self {
        Self::from_parts(joined.split(separator)).with_separator(separator)
    }

    /// Replaces the separator used for the string round-trip form.
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Number of parts. Fixed at construction.
    pub fn arity(&self) -> usize {
        self.parts.arity()
    }

    /// The separator used by [`to_joined`](StoreKey::to_joined) and
    /// [`set_string`](StoreKey::set_string).
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Returns the part at `index`.
    ///
    /// # Errors
    ///
    /// [`CacheError::KeyIndexOutOfRange`] if `index >= arity()`.
    pub fn part(&self, index: usize) -> Result<&str> {
        if index >= self.arity() {
            return Err(CacheError::KeyIndexOutOfRange {
                index,
                arity: self.arity(),
            });
        }
        Ok(self.parts.at(index))
    }

    /// Replaces the part at `index`. The arity never changes.
    ///
    /// # Errors
    ///
    /// [`CacheError::KeyIndexOutOfRange`] if `index >= arity()`; the key is
    /// left unchanged.
    pub fn set_part(&mut self, index: usize, value: impl Into<String>) -> Result<()> {
        if index >= self.arity() {
            return Err(CacheError::KeyIndexOutOfRange {
                index,
                arity: self.arity(),
            });
        }
        self.parts.set(index, value.into());
        self.cached_hash.set(None);
        Ok(())
    }

    /// Iterates the parts in order.
    pub fn parts(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.arity()).map(move |i| self.parts.at(i))
    }

    /// Serializes the key as `part1<sep>part2<sep>...`.
    ///
    /// The round trip through [`set_string`](StoreKey::set_string) is exact
    /// as long as no part embeds the separator.
    pub fn to_joined(&self) -> String {
        let mut joined = String::new();
        for (i, part) in self.parts().enumerate() {
            if i > 0 {
                joined.push(self.separator);
            }
            joined.push_str(part);
        }
        joined
    }

    /// Re-fills the parts by splitting `joined` on the key's separator.
    ///
    /// Tokens fill the parts left to right. When the input has fewer tokens
    /// than the arity, the remaining parts become empty strings.
    ///
    /// # Errors
    ///
    /// [`CacheError::KeyParseTooManyParts`] if the input splits into more
    /// tokens than the key's fixed arity; the key is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use cachestore::StoreKey;
    ///
    /// let mut key = StoreKey::pair("x", "y");
    /// key.set_string("a|b").unwrap();
    /// assert_eq!(key.to_joined(), "a|b");
    ///
    /// // Three tokens do not fit a two-part key
    /// assert!(key.set_string("a|b|c").is_err());
    /// assert_eq!(key.to_joined(), "a|b");
    /// ```
    pub fn set_string(&mut self, joined: &str) -> Result<()> {
        let tokens: Vec<&str> = joined.split(self.separator).collect();
        if tokens.len() > self.arity() {
            return Err(CacheError::KeyParseTooManyParts {
                found: tokens.len(),
                arity: self.arity(),
            });
        }
        for index in 0..self.arity() {
            let token = tokens.get(index).copied().unwrap_or("");
            self.parts.set(index, token.to_string());
        }
        self.cached_hash.set(None);
        Ok(())
    }

    /// XOR of the parts' individual hashes, computed once and cached until
    /// the next mutation.
    fn parts_hash(&self) -> u64 {
        if let Some(cached) = self.cached_hash.get() {
            return cached;
        }
        let mut acc = 0u64;
        for part in self.parts() {
            let mut hasher = DefaultHasher::new();
            part.hash(&mut hasher);
            acc ^= hasher.finish();
        }
        self.cached_hash.set(Some(acc));
        acc
    }
}

impl PartialEq for StoreKey {
    fn eq(&self, other: &Self) -> bool {
        self.arity() == other.arity() && self.parts().eq(other.parts())
    }
}

impl Eq for StoreKey {}

impl Hash for StoreKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.parts_hash());
    }
}

impl Ord for StoreKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.arity()
            .cmp(&other.arity())
            .then_with(|| self.parts().cmp(other.parts()))
    }
}

impl PartialOrd for StoreKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_joined())
    }
}

impl fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreKey({})", self.to_joined())
    }
}

impl From<&str> for StoreKey {
    /// Wraps a bare string as a single-part key.
    fn from(part: &str) -> Self {
        StoreKey::single(part)
    }
}

impl From<String> for StoreKey {
    fn from(part: String) -> Self {
        StoreKey::single(part)
    }
}
