//! Deferred mutations and their sequential, fail-fast execution.
//!
//! A [`Transaction`] is an ordered list of [`Command`]s. Nothing touches the
//! store until the transaction is committed; commit then runs the commands
//! one at a time, in enqueue order, and stops at the first failure. Commands
//! already applied at that point stay applied.

use tracing::{debug, info, warn};

use crate::document::{document_id, Collection, EntryDocument};
use crate::error::BackendError;
use crate::query::TermsQuery;
use crate::store::{BulkAction, BulkOutcome, DocumentStore, Refresh, StoreError};

/// A store mutation waiting to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create-if-absent one document per entry
    CreateDocs {
        collection: Collection,
        documents: Vec<EntryDocument>,
    },
    /// Delete documents by id, ignoring ids that are already gone
    DeleteDocs {
        collection: Collection,
        ids: Vec<String>,
    },
    /// Delete everything in the collection matching the query
    DeleteByQuery {
        collection: Collection,
        query: TermsQuery,
    },
    /// Drop a whole index namespace
    DeleteCollection { index: String },
}

impl Command {
    fn kind(&self) -> &'static str {
        match self {
            Command::CreateDocs { .. } => "create_docs",
            Command::DeleteDocs { .. } => "delete_docs",
            Command::DeleteByQuery { .. } => "delete_by_query",
            Command::DeleteCollection { .. } => "delete_collection",
        }
    }

    /// Apply this command against `store`.
    ///
    /// Absent targets are successes: a create that finds its id taken, a
    /// delete that finds nothing, a query over a missing collection.
    pub(crate) async fn apply<S: DocumentStore>(
        self,
        store: &S,
        refresh: Refresh,
    ) -> Result<(), BackendError<S::Error>> {
        match self {
            Command::CreateDocs {
                collection,
                documents,
            } => {
                if documents.is_empty() {
                    return Ok(());
                }
                let actions = documents
                    .into_iter()
                    .map(|document| BulkAction::Create {
                        collection: collection.clone(),
                        id: document_id(&document.key, &document.value),
                        document,
                    })
                    .collect::<Vec<_>>();
                debug!(%collection, count = actions.len(), "bulk create");
                run_bulk(store, actions, refresh).await
            }

            Command::DeleteDocs { collection, ids } => {
                if ids.is_empty() {
                    return Ok(());
                }
                let actions = ids
                    .into_iter()
                    .map(|id| BulkAction::Delete {
                        collection: collection.clone(),
                        id,
                    })
                    .collect::<Vec<_>>();
                debug!(%collection, count = actions.len(), "bulk delete");
                match run_bulk(store, actions, refresh).await {
                    Err(BackendError::MissingCollection(_)) => Ok(()),
                    other => other,
                }
            }

            Command::DeleteByQuery { collection, query } => {
                if query.is_empty() {
                    return Ok(());
                }
                match store.delete_by_query(&collection, &query, refresh).await {
                    Ok(deleted) => {
                        debug!(%collection, deleted, "delete by query");
                        Ok(())
                    }
                    Err(StoreError::NotFound(what)) => {
                        debug!(%collection, %what, "delete by query on missing collection");
                        Ok(())
                    }
                    Err(StoreError::Provider(e)) => Err(BackendError::Store(e)),
                }
            }

            Command::DeleteCollection { index } => match store.delete_index(&index).await {
                Ok(()) => {
                    info!(%index, "index deleted");
                    Ok(())
                }
                Err(StoreError::NotFound(_)) => {
                    debug!(%index, "index already absent");
                    Ok(())
                }
                Err(StoreError::Provider(e)) => Err(BackendError::Store(e)),
            },
        }
    }
}

async fn run_bulk<S: DocumentStore>(
    store: &S,
    actions: Vec<BulkAction>,
    refresh: Refresh,
) -> Result<(), BackendError<S::Error>> {
    let items = store.bulk(actions, refresh).await?;
    for item in items {
        match item.outcome {
            BulkOutcome::Created | BulkOutcome::Deleted => {}
            BulkOutcome::Conflict => debug!(id = %item.id, "entry already present"),
            BulkOutcome::NotFound => debug!(id = %item.id, "entry already absent"),
            BulkOutcome::Failed(reason) => {
                return Err(BackendError::BulkItem {
                    id: item.id,
                    reason,
                })
            }
        }
    }
    Ok(())
}

/// An ordered batch of deferred mutations.
///
/// Obtained from [`AclBackend::begin`](crate::AclBackend::begin) and consumed
/// by [`AclBackend::end`](crate::AclBackend::end), so a committed
/// transaction cannot be reused.
#[derive(Debug, Default)]
pub struct Transaction {
    commands: Vec<Command>,
}

impl Transaction {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The enqueued commands, in execution order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Run every command in order, stopping at the first failure.
    pub(crate) async fn commit<S: DocumentStore>(
        self,
        store: &S,
        refresh: Refresh,
    ) -> Result<(), BackendError<S::Error>> {
        let total = self.commands.len();
        for (position, command) in self.commands.into_iter().enumerate() {
            let kind = command.kind();
            if let Err(e) = command.apply(store, refresh).await {
                warn!(
                    position,
                    total,
                    kind,
                    error = %e,
                    "transaction aborted, later commands skipped"
                );
                return Err(e);
            }
        }
        info!(total, "transaction committed");
        Ok(())
    }
}
