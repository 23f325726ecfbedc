//! Disjunctive exact-match queries over a single document field.

use serde_json::{json, Value};

use crate::document::EntryDocument;
use crate::value::{normalize, EntryKey, OneOrMany};

/// Matches every document whose `field` equals any of `values`.
///
/// An empty value list matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermsQuery {
    field: String,
    values: Vec<EntryKey>,
}

impl TermsQuery {
    pub fn new(field: impl Into<String>, values: OneOrMany<EntryKey>) -> Self {
        Self {
            field: field.into(),
            values: normalize(values),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn values(&self) -> &[EntryKey] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Evaluate the query against a stored entry.
    ///
    /// Comparison is on the rendered string, the way a keyword field
    /// compares a numeric term with a string value.
    pub fn matches(&self, document: &EntryDocument) -> bool {
        let Some(actual) = document.field(&self.field) else {
            return false;
        };
        self.values.iter().any(|v| v.to_string() == actual)
    }

    /// Render as an Elasticsearch query clause.
    pub fn to_json(&self) -> Value {
        if self.values.is_empty() {
            return json!({ "match_none": {} });
        }

        let should: Vec<Value> = self
            .values
            .iter()
            .map(|v| json!({ "term": { self.field.as_str(): v } }))
            .collect();

        json!({
            "bool": {
                "should": should,
                "minimum_should_match": 1
            }
        })
    }
}
