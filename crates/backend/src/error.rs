//! Error types for the ACL backend.

use crate::store::StoreError;

/// Errors raised while constructing a backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No document-store client was supplied
    #[error("missing document store client")]
    MissingClient,

    /// Index name the store would reject
    #[error("invalid index name '{0}'")]
    InvalidIndex(String),

    /// Initial page size must be at least one
    #[error("invalid page size {0}")]
    InvalidPageSize(usize),

    /// Page size ceiling below the initial page size
    #[error("max page size {max_page_size} is below page size {page_size}")]
    InvalidMaxPageSize {
        page_size: usize,
        max_page_size: usize,
    },
}

/// Errors returned by backend operations, generic over the store's error.
#[derive(Debug, thiserror::Error)]
pub enum BackendError<T> {
    /// `key` is the field name holding set owners
    #[error("key name 'key' is not allowed")]
    ReservedKey,

    /// Buckets map to collections and need a name
    #[error("bucket name must not be empty")]
    EmptyBucket,

    /// Failure reported by the document store, passed through as-is
    #[error("document store error: {0}")]
    Store(#[source] T),

    /// A write targeted an index or collection the store could not find
    #[error("collection not found: {0}")]
    MissingCollection(String),

    /// One action of a bulk request failed for a reason other than an
    /// existing id on create or a missing id on delete
    #[error("bulk item {id} failed: {reason}")]
    BulkItem { id: String, reason: String },

    /// More matches than a single search may return
    #[error("{total} matches exceed the result window of {limit}")]
    ResultWindowExceeded { total: u64, limit: usize },
}

impl<T> From<StoreError<T>> for BackendError<T> {
    fn from(err: StoreError<T>) -> Self {
        match err {
            StoreError::Provider(e) => BackendError::Store(e),
            StoreError::NotFound(what) => BackendError::MissingCollection(what),
        }
    }
}

/// Result type alias for backend operations.
pub type BackendResult<T, E> = std::result::Result<T, BackendError<E>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn test_store_error_conversion() {
        let err: BackendError<Boom> = StoreError::Provider(Boom).into();
        assert!(matches!(err, BackendError::Store(Boom)));

        let err: BackendError<Boom> = StoreError::NotFound("acl".into()).into();
        assert!(matches!(err, BackendError::MissingCollection(ref c) if c == "acl"));
    }

    #[test]
    fn test_messages() {
        let err: BackendError<Boom> = BackendError::ReservedKey;
        assert_eq!(err.to_string(), "key name 'key' is not allowed");
        let err: BackendError<Boom> = BackendError::Store(Boom);
        assert_eq!(err.to_string(), "document store error: boom");
    }
}
