//! In-memory [`DocumentStore`] for tests and embedding.
//!
//! Behaves like a single-node index with immediate visibility. On top of
//! that it can mimic the store quirks the backend has to cope with: a
//! server-side cap on returned hits, misreported totals, rejected documents
//! and failing requests. Every call is recorded for inspection.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::document::{Collection, EntryDocument};
use crate::query::TermsQuery;
use crate::store::{
    BulkAction, BulkItem, BulkOutcome, DocumentStore, Refresh, SearchHits, StoreError,
};

/// A call the store received, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Search { collection: String, size: usize },
    Bulk { actions: usize },
    DeleteByQuery { collection: String },
    DeleteIndex { index: String },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryDocumentStoreError {
    #[error("memory store error: {0}")]
    Internal(String),
    #[error("injected failure on mutation {0}")]
    Injected(usize),
}

type Result<T> = std::result::Result<T, StoreError<MemoryDocumentStoreError>>;

#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<RwLock<MemoryDocumentStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryDocumentStoreInner {
    /// index -> collection -> document id -> document
    indices: HashMap<String, HashMap<String, BTreeMap<String, EntryDocument>>>,
    /// Upper bound on hits returned per search, whatever size is asked for
    result_cap: Option<usize>,
    /// Added to every reported total
    total_skew: u64,
    /// Values whose create actions fail
    rejected_values: HashSet<String>,
    /// Mutating calls seen so far
    mutations: usize,
    /// Mutation number that fails, if any
    fail_at: Option<usize>,
    calls: Vec<StoreCall>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return at most `cap` hits per search, like an engine's default window.
    pub fn with_result_cap(self, cap: usize) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.result_cap = Some(cap);
        }
        self
    }

    /// Report `extra` more matches than exist.
    pub fn misreport_totals(&self, extra: u64) {
        if let Ok(mut inner) = self.inner.write() {
            inner.total_skew = extra;
        }
    }

    /// Fail creates of documents holding `value`.
    pub fn reject_value(&self, value: &str) {
        if let Ok(mut inner) = self.inner.write() {
            inner.rejected_values.insert(value.to_owned());
        }
    }

    /// Fail the `nth` mutating call from now on (1-based).
    pub fn fail_mutation(&self, nth: usize) {
        if let Ok(mut inner) = self.inner.write() {
            inner.fail_at = Some(inner.mutations + nth);
        }
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.inner
            .read()
            .map(|inner| inner.calls.clone())
            .unwrap_or_default()
    }

    /// Number of documents stored in `collection`.
    pub fn document_count(&self, collection: &Collection) -> usize {
        self.inner
            .read()
            .ok()
            .and_then(|inner| {
                inner
                    .indices
                    .get(collection.index())
                    .and_then(|c| c.get(collection.name()))
                    .map(|docs| docs.len())
            })
            .unwrap_or(0)
    }

    /// Values stored for `key` in `collection`, in id order.
    pub fn values(&self, collection: &Collection, key: &str) -> Vec<String> {
        let Ok(inner) = self.inner.read() else {
            return Vec::new();
        };
        inner
            .indices
            .get(collection.index())
            .and_then(|c| c.get(collection.name()))
            .map(|docs| {
                docs.values()
                    .filter(|doc| doc.key.to_string() == key)
                    .map(|doc| doc.value.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryDocumentStoreInner>> {
        self.inner.read().map_err(|e| {
            StoreError::Provider(MemoryDocumentStoreError::Internal(format!(
                "failed to acquire read lock: {}",
                e
            )))
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryDocumentStoreInner>> {
        self.inner.write().map_err(|e| {
            StoreError::Provider(MemoryDocumentStoreError::Internal(format!(
                "failed to acquire write lock: {}",
                e
            )))
        })
    }
}

impl MemoryDocumentStoreInner {
    /// Count a mutating call and fail it if it is the armed one.
    fn mutate(&mut self, call: StoreCall) -> Result<()> {
        self.calls.push(call);
        self.mutations += 1;
        if self.fail_at == Some(self.mutations) {
            self.fail_at = None;
            return Err(StoreError::Provider(MemoryDocumentStoreError::Injected(
                self.mutations,
            )));
        }
        Ok(())
    }

    fn collection(&self, collection: &Collection) -> Result<&BTreeMap<String, EntryDocument>> {
        self.indices
            .get(collection.index())
            .and_then(|c| c.get(collection.name()))
            .ok_or_else(|| StoreError::NotFound(collection.to_string()))
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    type Error = MemoryDocumentStoreError;

    async fn search(
        &self,
        collection: &Collection,
        query: &TermsQuery,
        size: usize,
    ) -> Result<SearchHits> {
        let mut inner = self.write()?;
        inner.calls.push(StoreCall::Search {
            collection: collection.name().to_owned(),
            size,
        });

        let limit = inner.result_cap.map_or(size, |cap| cap.min(size));
        let matching: Vec<&EntryDocument> = inner
            .collection(collection)?
            .values()
            .filter(|doc| query.matches(doc))
            .collect();

        Ok(SearchHits {
            total: matching.len() as u64 + inner.total_skew,
            documents: matching.into_iter().take(limit).cloned().collect(),
        })
    }

    async fn bulk(&self, actions: Vec<BulkAction>, _refresh: Refresh) -> Result<Vec<BulkItem>> {
        let mut inner = self.write()?;
        inner.mutate(StoreCall::Bulk {
            actions: actions.len(),
        })?;

        let mut items = Vec::with_capacity(actions.len());
        for action in actions {
            let item = match action {
                BulkAction::Create {
                    collection,
                    id,
                    document,
                } => {
                    let outcome = if inner.rejected_values.contains(&document.value) {
                        BulkOutcome::Failed(format!("document rejected: {}", document.value))
                    } else {
                        let docs = inner
                            .indices
                            .entry(collection.index().to_owned())
                            .or_default()
                            .entry(collection.name().to_owned())
                            .or_default();
                        if docs.contains_key(&id) {
                            BulkOutcome::Conflict
                        } else {
                            docs.insert(id.clone(), document);
                            BulkOutcome::Created
                        }
                    };
                    BulkItem { id, outcome }
                }
                BulkAction::Delete { collection, id } => {
                    let removed = inner
                        .indices
                        .get_mut(collection.index())
                        .and_then(|c| c.get_mut(collection.name()))
                        .and_then(|docs| docs.remove(&id));
                    let outcome = match removed {
                        Some(_) => BulkOutcome::Deleted,
                        None => BulkOutcome::NotFound,
                    };
                    BulkItem { id, outcome }
                }
            };
            items.push(item);
        }
        Ok(items)
    }

    async fn delete_by_query(
        &self,
        collection: &Collection,
        query: &TermsQuery,
        _refresh: Refresh,
    ) -> Result<u64> {
        let mut inner = self.write()?;
        inner.mutate(StoreCall::DeleteByQuery {
            collection: collection.name().to_owned(),
        })?;

        let docs = inner
            .indices
            .get_mut(collection.index())
            .and_then(|c| c.get_mut(collection.name()))
            .ok_or_else(|| StoreError::NotFound(collection.to_string()))?;

        let before = docs.len();
        docs.retain(|_, doc| !query.matches(doc));
        Ok((before - docs.len()) as u64)
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        let mut inner = self.write()?;
        inner.mutate(StoreCall::DeleteIndex {
            index: index.to_owned(),
        })?;

        match inner.indices.remove(index) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(index.to_owned())),
        }
    }
}
