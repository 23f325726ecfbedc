//! Shared setup for backend integration tests
#![allow(dead_code)]

use acl_backend::{AclBackend, Collection, MemoryDocumentStore};

pub const INDEX: &str = "acltest";
pub const PREFIX: &str = "test_";

/// A backend over a fresh in-memory store, plus a handle on that store.
pub fn setup_backend(page_size: usize) -> (AclBackend<MemoryDocumentStore>, MemoryDocumentStore) {
    let store = MemoryDocumentStore::new();
    let backend = AclBackend::builder()
        .client(store.clone())
        .index(INDEX)
        .prefix(PREFIX)
        .refresh(true)
        .page_size(page_size)
        .build()
        .unwrap();
    (backend, store)
}

pub fn collection(bucket: &str) -> Collection {
    Collection::new(INDEX, PREFIX, bucket)
}

/// Stage `values` under `key` in `bucket` and commit.
pub async fn seed(
    backend: &AclBackend<MemoryDocumentStore>,
    bucket: &str,
    key: &str,
    values: &[&str],
) {
    let mut tx = backend.begin();
    backend.add(&mut tx, bucket, key, values).unwrap();
    backend.end(tx).await.unwrap();
}

/// Values sorted, for order-insensitive comparison.
pub fn sorted(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values
}
