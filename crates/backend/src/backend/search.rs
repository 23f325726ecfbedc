use tracing::{debug, warn};

use super::AclBackend;
use crate::document::KEY_FIELD;
use crate::error::BackendError;
use crate::query::TermsQuery;
use crate::store::{DocumentStore, SearchHits, StoreError};
use crate::value::{normalize, EntryKey, OneOrMany};

/// Searches issued for one read before settling for what came back.
pub const MAX_FETCH_ATTEMPTS: usize = 5;

impl<S: DocumentStore> AclBackend<S> {
    /// Values stored for `key` in `bucket`.
    pub async fn get(
        &self,
        bucket: &str,
        key: impl Into<EntryKey>,
    ) -> Result<Vec<String>, BackendError<S::Error>> {
        self.search(bucket, OneOrMany::One(key.into())).await
    }

    /// Union of the values stored for `keys` in `bucket`, each value once.
    pub async fn union<K>(
        &self,
        bucket: &str,
        keys: &[K],
    ) -> Result<Vec<String>, BackendError<S::Error>>
    where
        K: Clone + Into<EntryKey>,
    {
        let keys = keys.iter().cloned().map(Into::into).collect::<Vec<_>>();
        let values = self.search(bucket, OneOrMany::Many(keys)).await?;
        Ok(normalize(OneOrMany::Many(values)))
    }

    /// Fetch every entry of `bucket` owned by any of `keys`.
    ///
    /// Stores cap how many hits one search returns. When the reported total
    /// is larger than what came back, the search is re-issued with the total
    /// as page size, up to `max_page_size` and [`MAX_FETCH_ATTEMPTS`].
    pub(crate) async fn search(
        &self,
        bucket: &str,
        keys: OneOrMany<EntryKey>,
    ) -> Result<Vec<String>, BackendError<S::Error>> {
        let collection = self.collection(bucket)?;
        let query = TermsQuery::new(KEY_FIELD, keys);
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let limit = self.config.max_page_size;
        let mut page_size = self.config.page_size;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let hits = match self.store.search(&collection, &query, page_size).await {
                Ok(hits) => hits,
                Err(StoreError::NotFound(what)) => {
                    debug!(%collection, %what, "search on missing collection");
                    return Ok(Vec::new());
                }
                Err(StoreError::Provider(e)) => return Err(BackendError::Store(e)),
            };

            let fetched = hits.documents.len() as u64;
            debug!(%collection, page_size, fetched, total = hits.total, attempt, "search page");
            if fetched >= hits.total {
                return Ok(project(hits));
            }

            if hits.total > limit as u64 {
                return Err(BackendError::ResultWindowExceeded {
                    total: hits.total,
                    limit,
                });
            }

            let next = hits.total as usize;
            if next <= page_size {
                warn!(
                    %collection,
                    page_size,
                    fetched,
                    total = hits.total,
                    "store returned fewer hits than it reported"
                );
                return Ok(project(hits));
            }

            if attempt >= MAX_FETCH_ATTEMPTS {
                warn!(
                    %collection,
                    attempt,
                    fetched,
                    total = hits.total,
                    "match count kept growing, returning last page"
                );
                return Ok(project(hits));
            }

            page_size = next;
        }
    }
}

fn project(hits: SearchHits) -> Vec<String> {
    hits.documents.into_iter().map(|doc| doc.value).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::config::BackendConfig;
    use crate::memory::{MemoryDocumentStore, StoreCall};

    fn backend(store: &MemoryDocumentStore, page_size: usize) -> AclBackend<MemoryDocumentStore> {
        AclBackend::builder()
            .client(store.clone())
            .page_size(page_size)
            .build()
            .unwrap()
    }

    async fn seed(backend: &AclBackend<MemoryDocumentStore>, key: &str, count: usize) {
        let values = (1..=count).map(|i| format!("v{}", i)).collect::<Vec<_>>();
        let mut tx = backend.begin();
        backend.add(&mut tx, "users", key, &values).unwrap();
        backend.end(tx).await.unwrap();
    }

    fn searches(store: &MemoryDocumentStore) -> Vec<usize> {
        store
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Search { size, .. } => Some(size),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_single_page_needs_one_search() {
        let store = MemoryDocumentStore::new();
        let backend = backend(&store, 100);
        seed(&backend, "u1", 3).await;

        let values = backend.get("users", "u1").await.unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(searches(&store), vec![100]);
    }

    #[tokio::test]
    async fn test_refetches_with_reported_total() {
        let store = MemoryDocumentStore::new();
        let backend = backend(&store, 10);
        seed(&backend, "u1", 15).await;

        let values = backend.get("users", "u1").await.unwrap();
        let expected = (1..=15).map(|i| format!("v{}", i)).collect::<BTreeSet<_>>();
        assert_eq!(values.into_iter().collect::<BTreeSet<_>>(), expected);
        assert_eq!(searches(&store), vec![10, 15]);
    }

    #[tokio::test]
    async fn test_store_cap_is_not_retried_forever() {
        let store = MemoryDocumentStore::new().with_result_cap(10);
        let backend = backend(&store, 5);
        seed(&backend, "u1", 15).await;

        let values = backend.get("users", "u1").await.unwrap();
        assert_eq!(values.len(), 10);
        assert_eq!(searches(&store), vec![5, 15]);
    }

    #[tokio::test]
    async fn test_misreported_total_stops_after_covering_page() {
        let store = MemoryDocumentStore::new();
        let backend = backend(&store, 2);
        seed(&backend, "u1", 4).await;
        store.misreport_totals(1);

        let values = backend.get("users", "u1").await.unwrap();
        assert_eq!(values.len(), 4);
        assert_eq!(searches(&store), vec![2, 5]);
    }

    #[tokio::test]
    async fn test_total_above_window_is_an_error() {
        let store = MemoryDocumentStore::new();
        let backend = AclBackend::builder()
            .client(store.clone())
            .page_size(2)
            .max_page_size(4)
            .build()
            .unwrap();
        seed(&backend, "u1", 6).await;

        let err = backend.get("users", "u1").await.unwrap_err();
        assert!(matches!(
            err,
            BackendError::ResultWindowExceeded { total: 6, limit: 4 }
        ));
    }

    #[tokio::test]
    async fn test_missing_bucket_reads_empty() {
        let store = MemoryDocumentStore::new();
        let backend = backend(&store, 10);
        assert!(backend.get("nobody", "u1").await.unwrap().is_empty());
        assert!(backend.union("nobody", &["u1", "u2"]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_union_of_no_keys_skips_the_store() {
        let store = MemoryDocumentStore::new();
        let backend = backend(&store, 10);
        let keys: [&str; 0] = [];
        assert!(backend.union("users", &keys).await.unwrap().is_empty());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_union_merges_and_dedups() {
        let store = MemoryDocumentStore::new();
        let backend = backend(&store, 10);
        let mut tx = backend.begin();
        backend.add(&mut tx, "users", "u1", &["a", "b"]).unwrap();
        backend.add(&mut tx, "users", "u2", &["b", "c"]).unwrap();
        backend.add(&mut tx, "users", "u3", &["z"]).unwrap();
        backend.end(tx).await.unwrap();

        let values = backend.union("users", &["u1", "u2"]).await.unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(
            values.into_iter().collect::<BTreeSet<_>>(),
            ["a", "b", "c"].iter().map(|s| s.to_string()).collect()
        );
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        #[derive(Debug, Clone)]
        struct Broken;

        #[derive(Debug, thiserror::Error)]
        #[error("connection refused")]
        struct Refused;

        #[async_trait::async_trait]
        impl DocumentStore for Broken {
            type Error = Refused;

            async fn search(
                &self,
                _: &crate::document::Collection,
                _: &TermsQuery,
                _: usize,
            ) -> Result<SearchHits, StoreError<Refused>> {
                Err(StoreError::Provider(Refused))
            }

            async fn bulk(
                &self,
                _: Vec<crate::store::BulkAction>,
                _: crate::store::Refresh,
            ) -> Result<Vec<crate::store::BulkItem>, StoreError<Refused>> {
                Err(StoreError::Provider(Refused))
            }

            async fn delete_by_query(
                &self,
                _: &crate::document::Collection,
                _: &TermsQuery,
                _: crate::store::Refresh,
            ) -> Result<u64, StoreError<Refused>> {
                Err(StoreError::Provider(Refused))
            }

            async fn delete_index(&self, _: &str) -> Result<(), StoreError<Refused>> {
                Err(StoreError::Provider(Refused))
            }
        }

        let backend = AclBackend::new(Broken, BackendConfig::default()).unwrap();
        let err = backend.get("users", "u1").await.unwrap_err();
        assert!(matches!(err, BackendError::Store(Refused)));
        assert_eq!(err.to_string(), "document store error: connection refused");
    }
}
