//! Scalar and sequence shapes accepted at the backend boundary.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Owner of a value set inside a bucket.
///
/// Keys are persisted as-is in the `key` field of an entry document, so a
/// numeric key stays numeric in the index. Two keys that render to the same
/// string address the same set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryKey {
    Int(i64),
    Str(String),
}

/// Field name used to store the set owner; not usable as a key itself.
pub const RESERVED_KEY: &str = "key";

impl EntryKey {
    /// Whether this key collides with the document field that stores it.
    pub fn is_reserved(&self) -> bool {
        matches!(self, EntryKey::Str(s) if s == RESERVED_KEY)
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKey::Int(n) => write!(f, "{}", n),
            EntryKey::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for EntryKey {
    fn from(s: &str) -> Self {
        EntryKey::Str(s.to_owned())
    }
}

impl From<&String> for EntryKey {
    fn from(s: &String) -> Self {
        EntryKey::Str(s.clone())
    }
}

impl From<String> for EntryKey {
    fn from(s: String) -> Self {
        EntryKey::Str(s)
    }
}

impl From<i64> for EntryKey {
    fn from(n: i64) -> Self {
        EntryKey::Int(n)
    }
}

/// Either a single item or a sequence of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Coerce into a sequence, keeping order and duplicates.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// Coerce a scalar-or-sequence input into a sequence without duplicates.
///
/// First occurrence wins, so the relative order of the input is preserved.
pub fn normalize<T>(input: OneOrMany<T>) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let items = input.into_vec();
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
