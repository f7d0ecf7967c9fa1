use thiserror::Error;

/// Unified error type for the cache library.
///
/// Every variant is a local precondition violation: the failing operation
/// returns before any mutation, so callers never observe partial state.
/// None of these are retriable: they indicate programmer errors, not
/// transient conditions.
///
/// # Examples
///
/// ```
/// use cachestore::{CacheError, StoreKey};
///
/// let key = StoreKey::single("user");
/// let err = key.part(3).unwrap_err();
/// assert_eq!(
///     err,
///     CacheError::KeyIndexOutOfRange { index: 3, arity: 1 }
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A key part index outside `[0, arity)` was passed to `part` or `set_part`.
    #[error("key part index {index} out of range for arity {arity}")]
    KeyIndexOutOfRange { index: usize, arity: usize },

    /// `set_string` input decomposed into more parts than the key's fixed arity.
    #[error("input decomposes into {found} parts but key arity is {arity}")]
    KeyParseTooManyParts { found: usize, arity: usize },

    /// A `RecencyIndex` touch carried a timestamp earlier than the current
    /// newest entry, which would break the sorted order the index relies on.
    #[error("touch timestamp {timestamp} is earlier than newest timestamp {newest}")]
    TimestampRegression { timestamp: u64, newest: u64 },
}

/// Convenience Result type for the cache library.
pub type Result<T> = std::result::Result<T, CacheError>;
