//! Elasticsearch storage for access-control lists
//!
//! Access-control data is kept as buckets of `key -> {values}` sets. Every
//! member of a set is one small document `{key, value}` with a deterministic
//! id, so adding an existing member or removing a missing one is a no-op.
//!
//! Reads go straight to the store. Writes are staged on a [`Transaction`]
//! and applied in order when it is handed back to [`AclBackend::end`].
//!
//! # Example
//!
//! ```rust,no_run
//! use acl_backend::{AclBackend, ElasticsearchClient};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ElasticsearchClient::new(&Url::parse("http://localhost:9200")?)?;
//! let backend = AclBackend::builder()
//!     .client(client)
//!     .index("acl")
//!     .prefix("myapp_")
//!     .refresh(true)
//!     .build()?;
//!
//! let mut tx = backend.begin();
//! backend.add(&mut tx, "roles", "admin", &["read", "write"])?;
//! backend.end(tx).await?;
//!
//! let values = backend.get("roles", "admin").await?;
//! assert_eq!(values.len(), 2);
//! # Ok(())
//! # }
//! ```

mod backend;
mod config;
mod document;
mod error;
mod query;
mod store;
mod transaction;
mod value;

pub mod elasticsearch;
pub mod memory;

pub use backend::{AclBackend, BackendBuilder, MAX_FETCH_ATTEMPTS};
pub use config::{BackendConfig, DEFAULT_INDEX, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE};
pub use document::{document_id, Collection, EntryDocument, KEY_FIELD, VALUE_FIELD};
pub use elasticsearch::{ElasticsearchClient, ElasticsearchError};
pub use error::{BackendError, BackendResult, ConfigError};
pub use memory::MemoryDocumentStore;
pub use query::TermsQuery;
pub use store::{
    BulkAction, BulkItem, BulkOutcome, DocumentStore, Refresh, SearchHits, StoreError,
};
pub use transaction::{Command, Transaction};
pub use value::{normalize, EntryKey, OneOrMany, RESERVED_KEY};
