//! The set-storage facade.
//!
//! [`AclBackend`] exposes the contract an access-control layer expects from
//! its storage: read a key's value set, read the union of several sets, and
//! stage additions and removals in a transaction that is applied on `end`.

mod mutations;
mod search;

use tracing::info;

use crate::config::BackendConfig;
use crate::document::Collection;
use crate::error::{BackendError, ConfigError};
use crate::store::{DocumentStore, Refresh};
use crate::transaction::{Command, Transaction};

pub use search::MAX_FETCH_ATTEMPTS;

/// Stores buckets of `key -> {values}` sets as one document per member.
#[derive(Debug, Clone)]
pub struct AclBackend<S> {
    store: S,
    config: BackendConfig,
}

impl<S: DocumentStore> AclBackend<S> {
    /// Create a backend over `store`, validating `config`.
    pub fn new(store: S, config: BackendConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn builder() -> BackendBuilder<S> {
        BackendBuilder::new()
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Start an empty transaction. Does not touch the store.
    pub fn begin(&self) -> Transaction {
        Transaction::new()
    }

    /// Apply a transaction's commands in order.
    ///
    /// The first failing command aborts the rest and its error is returned;
    /// earlier commands are not rolled back.
    pub async fn end(&self, transaction: Transaction) -> Result<(), BackendError<S::Error>> {
        transaction.commit(&self.store, self.config.refresh).await
    }

    /// Drop every bucket under the configured index, immediately.
    pub async fn clean(&self) -> Result<(), BackendError<S::Error>> {
        info!(index = %self.config.index, "cleaning backend storage");
        Command::DeleteCollection {
            index: self.config.index.clone(),
        }
        .apply(&self.store, self.config.refresh)
        .await
    }

    fn collection(&self, bucket: &str) -> Result<Collection, BackendError<S::Error>> {
        if bucket.is_empty() {
            return Err(BackendError::EmptyBucket);
        }
        Ok(Collection::new(
            &self.config.index,
            &self.config.prefix,
            bucket,
        ))
    }
}

/// Step-by-step construction; only the client is mandatory.
#[derive(Debug)]
pub struct BackendBuilder<S> {
    client: Option<S>,
    config: BackendConfig,
}

impl<S> Default for BackendBuilder<S> {
    fn default() -> Self {
        Self {
            client: None,
            config: BackendConfig::default(),
        }
    }
}

impl<S: DocumentStore> BackendBuilder<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(mut self, client: S) -> Self {
        self.client = Some(client);
        self
    }

    /// Replace every setting at once.
    pub fn config(mut self, config: BackendConfig) -> Self {
        self.config = config;
        self
    }

    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.config.index = index.into();
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    pub fn refresh(mut self, refresh: impl Into<Refresh>) -> Self {
        self.config.refresh = refresh.into();
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.config.page_size = page_size;
        self
    }

    pub fn max_page_size(mut self, max_page_size: usize) -> Self {
        self.config.max_page_size = max_page_size;
        self
    }

    pub fn build(self) -> Result<AclBackend<S>, ConfigError> {
        let client = self.client.ok_or(ConfigError::MissingClient)?;
        AclBackend::new(client, self.config)
    }
}
