//! The document-store capabilities the backend is written against.

use std::fmt::{Debug, Display};
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::{Collection, EntryDocument};
use crate::query::TermsQuery;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError<T> {
    /// Anything the store itself reports
    #[error("unhandled document store error: {0}")]
    Provider(#[from] T),
    /// The addressed index or collection does not exist
    #[error("not found: {0}")]
    NotFound(String),
}

/// Whether a write must be visible to the next read before it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RefreshRepr", into = "RefreshRepr")]
pub enum Refresh {
    /// Eventual visibility
    #[default]
    False,
    /// Force a refresh of the affected shards
    True,
    /// Block until the next scheduled refresh
    WaitFor,
}

impl Refresh {
    pub fn as_param(&self) -> &'static str {
        match self {
            Refresh::False => "false",
            Refresh::True => "true",
            Refresh::WaitFor => "wait_for",
        }
    }
}

impl Display for Refresh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_param())
    }
}

impl FromStr for Refresh {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "false" => Ok(Refresh::False),
            "true" => Ok(Refresh::True),
            "wait_for" => Ok(Refresh::WaitFor),
            other => Err(format!(
                "invalid refresh mode '{}', expected false, true or wait_for",
                other
            )),
        }
    }
}

impl From<bool> for Refresh {
    fn from(b: bool) -> Self {
        if b {
            Refresh::True
        } else {
            Refresh::False
        }
    }
}

// Config files spell the mode either as a bool or as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RefreshRepr {
    Bool(bool),
    Str(String),
}

impl TryFrom<RefreshRepr> for Refresh {
    type Error = String;

    fn try_from(repr: RefreshRepr) -> Result<Self, Self::Error> {
        match repr {
            RefreshRepr::Bool(b) => Ok(b.into()),
            RefreshRepr::Str(s) => s.parse(),
        }
    }
}

impl From<Refresh> for RefreshRepr {
    fn from(refresh: Refresh) -> Self {
        match refresh {
            Refresh::False => RefreshRepr::Bool(false),
            Refresh::True => RefreshRepr::Bool(true),
            Refresh::WaitFor => RefreshRepr::Str(refresh.as_param().to_owned()),
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHits {
    /// Number of matching documents the store says exist
    pub total: u64,
    /// Matching documents actually returned in this page
    pub documents: Vec<EntryDocument>,
}

/// A single action inside a bulk request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkAction {
    /// Create-if-absent
    Create {
        collection: Collection,
        id: String,
        document: EntryDocument,
    },
    Delete {
        collection: Collection,
        id: String,
    },
}

impl BulkAction {
    pub fn id(&self) -> &str {
        match self {
            BulkAction::Create { id, .. } | BulkAction::Delete { id, .. } => id,
        }
    }

    pub fn collection(&self) -> &Collection {
        match self {
            BulkAction::Create { collection, .. } | BulkAction::Delete { collection, .. } => {
                collection
            }
        }
    }
}

/// How the store resolved one bulk action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOutcome {
    Created,
    Deleted,
    /// A create hit an id that already exists
    Conflict,
    /// A delete hit an id that does not exist
    NotFound,
    Failed(String),
}

/// Per-action result of a bulk request, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItem {
    pub id: String,
    pub outcome: BulkOutcome,
}

/// A schemaless document index the backend persists entries into.
///
/// Implementations report a missing index or collection as
/// [`StoreError::NotFound`]; the backend decides when that is benign.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Return up to `size` documents of `collection` matching `query`,
    /// together with the total number of matches.
    async fn search(
        &self,
        collection: &Collection,
        query: &TermsQuery,
        size: usize,
    ) -> Result<SearchHits, StoreError<Self::Error>>;

    /// Apply a batch of create/delete actions.
    ///
    /// Per-item failures are reported through [`BulkOutcome`], not as an
    /// error of the whole request.
    async fn bulk(
        &self,
        actions: Vec<BulkAction>,
        refresh: Refresh,
    ) -> Result<Vec<BulkItem>, StoreError<Self::Error>>;

    /// Delete every document of `collection` matching `query`, returning
    /// how many were removed.
    async fn delete_by_query(
        &self,
        collection: &Collection,
        query: &TermsQuery,
        refresh: Refresh,
    ) -> Result<u64, StoreError<Self::Error>>;

    /// Drop a whole index namespace.
    async fn delete_index(&self, index: &str) -> Result<(), StoreError<Self::Error>>;
}
