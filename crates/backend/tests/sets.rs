//! Integration tests for set reads and mutations

mod common;

use acl_backend::BackendError;

#[tokio::test]
async fn test_role_round_trip() {
    let (backend, _store) = common::setup_backend(1000);
    common::seed(&backend, "roles", "admin", &["read", "write"]).await;

    let values = backend.get("roles", "admin").await.unwrap();
    assert_eq!(common::sorted(values), vec!["read", "write"]);
}

#[tokio::test]
async fn test_add_is_idempotent() {
    let (backend, store) = common::setup_backend(1000);
    common::seed(&backend, "roles", "admin", &["read"]).await;
    common::seed(&backend, "roles", "admin", &["read"]).await;

    assert_eq!(backend.get("roles", "admin").await.unwrap(), vec!["read"]);
    assert_eq!(store.document_count(&common::collection("roles")), 1);
}

#[tokio::test]
async fn test_remove_missing_value_is_a_noop() {
    let (backend, _store) = common::setup_backend(1000);
    common::seed(&backend, "roles", "admin", &["read"]).await;

    let mut tx = backend.begin();
    backend
        .remove(&mut tx, "roles", "admin", &["write"])
        .unwrap();
    backend
        .remove(&mut tx, "roles", "nobody", &["read"])
        .unwrap();
    backend.end(tx).await.unwrap();

    assert_eq!(backend.get("roles", "admin").await.unwrap(), vec!["read"]);
}

#[tokio::test]
async fn test_large_set_is_fetched_completely() {
    let (backend, _store) = common::setup_backend(10);
    let values = (1..=15).map(|i| format!("perm{:02}", i)).collect::<Vec<_>>();
    let mut tx = backend.begin();
    backend.add(&mut tx, "roles", "admin", &values).unwrap();
    backend.end(tx).await.unwrap();

    let fetched = backend.get("roles", "admin").await.unwrap();
    assert_eq!(fetched.len(), 15);
    assert_eq!(common::sorted(fetched), values);
}

#[tokio::test]
async fn test_remove_leaves_other_members() {
    let (backend, _store) = common::setup_backend(1000);
    common::seed(&backend, "roles", "admin", &["read", "write", "delete"]).await;

    let mut tx = backend.begin();
    backend
        .remove(&mut tx, "roles", "admin", &["write"])
        .unwrap();
    backend.end(tx).await.unwrap();

    let values = backend.get("roles", "admin").await.unwrap();
    assert_eq!(common::sorted(values), vec!["delete", "read"]);
}

#[tokio::test]
async fn test_del_leaves_other_keys() {
    let (backend, _store) = common::setup_backend(1000);
    common::seed(&backend, "roles", "admin", &["read", "write"]).await;
    common::seed(&backend, "roles", "guest", &["read"]).await;

    let mut tx = backend.begin();
    backend.del(&mut tx, "roles", &["admin"]).unwrap();
    backend.end(tx).await.unwrap();

    assert!(backend.get("roles", "admin").await.unwrap().is_empty());
    assert_eq!(backend.get("roles", "guest").await.unwrap(), vec!["read"]);
}

#[tokio::test]
async fn test_buckets_are_isolated() {
    let (backend, _store) = common::setup_backend(1000);
    common::seed(&backend, "roles", "admin", &["read"]).await;
    common::seed(&backend, "users", "admin", &["alice"]).await;

    let mut tx = backend.begin();
    backend.del(&mut tx, "users", &["admin"]).unwrap();
    backend.end(tx).await.unwrap();

    assert_eq!(backend.get("roles", "admin").await.unwrap(), vec!["read"]);
    assert!(backend.get("users", "admin").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reserved_key_is_rejected() {
    let (backend, store) = common::setup_backend(1000);
    let mut tx = backend.begin();

    let err = backend.add(&mut tx, "roles", "key", &["x"]).unwrap_err();
    assert!(matches!(err, BackendError::ReservedKey));
    assert_eq!(err.to_string(), "key name 'key' is not allowed");

    backend.end(tx).await.unwrap();
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_union_across_keys() {
    let (backend, _store) = common::setup_backend(1000);
    common::seed(&backend, "roles", "admin", &["read", "write"]).await;
    common::seed(&backend, "roles", "editor", &["write", "publish"]).await;
    common::seed(&backend, "roles", "guest", &["browse"]).await;

    let values = backend
        .union("roles", &["admin", "editor", "missing"])
        .await
        .unwrap();
    assert_eq!(common::sorted(values), vec!["publish", "read", "write"]);
}

#[tokio::test]
async fn test_numeric_keys_match_their_string_form() {
    let (backend, _store) = common::setup_backend(1000);
    let mut tx = backend.begin();
    backend.add(&mut tx, "users", 42i64, &["admin"]).unwrap();
    backend.end(tx).await.unwrap();

    assert_eq!(backend.get("users", 42i64).await.unwrap(), vec!["admin"]);
    assert_eq!(backend.get("users", "42").await.unwrap(), vec!["admin"]);
}
