//! Entry documents and the deterministic identity scheme behind them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::EntryKey;

/// Field holding the set owner.
pub const KEY_FIELD: &str = "key";
/// Field holding the set member.
pub const VALUE_FIELD: &str = "value";

/// Identity of the entry for `(key, value)`.
///
/// Creating an id that already exists is a conflict, deleting one that does
/// not exist is a miss; both are what make `add` and `remove` idempotent.
/// Distinct pairs that render identically (`"a-b" + "c"` vs `"a" + "b-c"`)
/// share an id; callers avoid building those.
pub fn document_id(key: &EntryKey, value: &str) -> String {
    format!("{}-{}", key, value)
}

/// One persisted `(key, value)` membership record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDocument {
    pub key: EntryKey,
    pub value: String,
}

impl EntryDocument {
    pub fn new(key: EntryKey, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }

    pub fn id(&self) -> String {
        document_id(&self.key, &self.value)
    }

    /// Rendered value of a named field, if the schema has it.
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            KEY_FIELD => Some(self.key.to_string()),
            VALUE_FIELD => Some(self.value.clone()),
            _ => None,
        }
    }
}

/// Where a bucket's entries live: a named collection inside an index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Collection {
    index: String,
    name: String,
}

impl Collection {
    /// Collection for `bucket` under `index`, namespaced by `prefix`.
    pub fn new(index: &str, prefix: &str, bucket: &str) -> Self {
        Self {
            index: index.to_owned(),
            name: format!("{}{}", prefix, bucket),
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index, self.name)
    }
}
