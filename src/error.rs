//! Error types for the evictkit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache construction parameters are invalid
//!   (zero capacity, unknown policy name).
//! - [`InvariantError`]: Returned by the debug-only `check_invariants`
//!   methods when a store's index and ordering structure disagree.
//!
//! Lookup misses are not errors; they surface as `None` / `false`.
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::error::ConfigError;
//! use evictkit::policy::lru::LruCache;
//!
//! let cache: Result<LruCache<u64, String>, ConfigError> = LruCache::try_new(100);
//! assert!(cache.is_ok());
//!
//! let bad = LruCache::<u64, String>::try_new(0);
//! assert!(bad.unwrap_err().to_string().contains("capacity"));
//! ```

use thiserror::Error;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`LruCache::try_new`](crate::policy::lru::LruCache::try_new), by the
/// factory functions in [`builder`](crate::builder), and by parsing a
/// [`CachePolicy`](crate::builder::CachePolicy) from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Error for a capacity that cannot hold a single entry.
    pub(crate) fn zero_capacity() -> Self {
        Self::new("capacity must be greater than zero")
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by the `check_invariants` methods available in test and debug
/// builds. Carries a description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("unknown policy `arc`");
        assert_eq!(err.to_string(), "unknown policy `arc`");
        assert_eq!(err.message(), "unknown policy `arc`");
    }

    #[test]
    fn zero_capacity_mentions_capacity() {
        let err = ConfigError::zero_capacity();
        assert!(err.message().contains("capacity"));
    }

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("index/list length mismatch");
        assert_eq!(err.to_string(), "index/list length mismatch");
        assert_eq!(err.clone(), err);
    }

    #[test]
    fn errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<ConfigError>();
        assert_error::<InvariantError>();
    }
}
