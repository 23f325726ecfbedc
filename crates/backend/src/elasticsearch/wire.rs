//! Request bodies and response shapes of the Elasticsearch REST API.
//!
//! Every bucket collection shares the namespace index. Documents carry a
//! `collection` keyword and their `_id` is prefixed with the length and
//! name of the collection, so equal entry ids in different buckets stay
//! distinct even when bucket names and keys contain `/`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::document::{Collection, EntryDocument, KEY_FIELD, VALUE_FIELD};
use crate::query::TermsQuery;
use crate::store::{BulkAction, BulkItem, BulkOutcome};

/// Field tagging each document with its bucket collection.
pub const COLLECTION_FIELD: &str = "collection";

/// `_id` of an entry inside the shared index: `{len}:{collection}/{id}`.
pub fn es_id(collection: &Collection, id: &str) -> String {
    let name = collection.name();
    format!("{}:{}/{}", name.len(), name, id)
}

/// Entry id back from an `_id` built by [`es_id`]. Anything else is
/// returned unchanged.
fn entry_id(es_id: &str) -> &str {
    es_id
        .split_once(':')
        .and_then(|(len, rest)| {
            let len = len.parse::<usize>().ok()?;
            rest.get(len..)?.strip_prefix('/')
        })
        .unwrap_or(es_id)
}

/// `query` restricted to the documents of `collection`.
pub fn scoped_query(collection: &Collection, query: &TermsQuery) -> Value {
    json!({
        "bool": {
            "filter": [
                { "term": { COLLECTION_FIELD: collection.name() } },
                query.to_json()
            ]
        }
    })
}

pub fn search_body(collection: &Collection, query: &TermsQuery, size: usize) -> Value {
    json!({
        "size": size,
        "track_total_hits": true,
        "query": scoped_query(collection, query)
    })
}

pub fn delete_by_query_body(collection: &Collection, query: &TermsQuery) -> Value {
    json!({ "query": scoped_query(collection, query) })
}

/// Newline-delimited bulk body; one action line, plus a source line for
/// creates.
pub fn bulk_body(actions: &[BulkAction]) -> Result<String, serde_json::Error> {
    let mut body = String::new();
    for action in actions {
        match action {
            BulkAction::Create {
                collection,
                id,
                document,
            } => {
                let meta = json!({
                    "create": { "_index": collection.index(), "_id": es_id(collection, id) }
                });
                body.push_str(&serde_json::to_string(&meta)?);
                body.push('\n');
                body.push_str(&serde_json::to_string(&StoredDocument::new(
                    collection, document,
                ))?);
                body.push('\n');
            }
            BulkAction::Delete { collection, id } => {
                let meta = json!({
                    "delete": { "_index": collection.index(), "_id": es_id(collection, id) }
                });
                body.push_str(&serde_json::to_string(&meta)?);
                body.push('\n');
            }
        }
    }
    Ok(body)
}

/// Composable template mapping every entry field as an exact-match keyword.
pub fn index_template(index: &str) -> Value {
    json!({
        "index_patterns": [index],
        "template": {
            "mappings": {
                "dynamic": "strict",
                "properties": {
                    COLLECTION_FIELD: { "type": "keyword" },
                    KEY_FIELD: { "type": "keyword" },
                    VALUE_FIELD: { "type": "keyword" }
                }
            }
        }
    })
}

/// `_source` of an entry document as indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub collection: String,
    #[serde(flatten)]
    pub entry: EntryDocument,
}

impl StoredDocument {
    fn new(collection: &Collection, entry: &EntryDocument) -> Self {
        Self {
            collection: collection.name().to_owned(),
            entry: entry.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub hits: Hits,
}

#[derive(Debug, Deserialize)]
pub struct Hits {
    pub total: Total,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// `hits.total` is a bare number before 7.0 and an object since.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Total {
    Legacy(u64),
    Tracked { value: u64 },
}

impl Total {
    pub fn value(&self) -> u64 {
        match self {
            Total::Legacy(n) | Total::Tracked { value: n } => *n,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_source")]
    pub source: StoredDocument,
}

#[derive(Debug, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub items: Vec<HashMap<String, BulkResponseItem>>,
}

#[derive(Debug, Deserialize)]
pub struct BulkResponseItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub status: u16,
    #[serde(default)]
    pub error: Option<Value>,
}

impl BulkResponse {
    /// Per-action outcomes, in request order.
    pub fn into_items(self) -> Vec<BulkItem> {
        self.items
            .into_iter()
            .flat_map(|entry| entry.into_iter())
            .map(|(op, item)| {
                let outcome = match (op.as_str(), item.status) {
                    ("create", 200 | 201) => BulkOutcome::Created,
                    ("delete", 200) => BulkOutcome::Deleted,
                    ("create", 409) => BulkOutcome::Conflict,
                    ("delete", 404) => BulkOutcome::NotFound,
                    (_, status) => BulkOutcome::Failed(
                        item.error
                            .map(|e| e.to_string())
                            .unwrap_or_else(|| format!("{} returned status {}", op, status)),
                    ),
                };
                BulkItem {
                    id: entry_id(&item.id).to_owned(),
                    outcome,
                }
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteByQueryResponse {
    #[serde(default)]
    pub deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::document_id;
    use crate::value::OneOrMany;

    fn users() -> Collection {
        Collection::new("acl", "p_", "users")
    }

    #[test]
    fn test_es_id_round_trip() {
        let id = es_id(&users(), "u1-admin");
        assert_eq!(id, "7:p_users/u1-admin");
        assert_eq!(entry_id(&id), "u1-admin");
    }

    #[test]
    fn test_slashes_in_bucket_and_key_do_not_collide() {
        let plain = Collection::new("acl", "", "allows_");
        let nested = Collection::new("acl", "", "allows_/x");
        let left = es_id(&plain, &document_id(&"x/admin".into(), "get"));
        let right = es_id(&nested, &document_id(&"admin".into(), "get"));

        assert_ne!(left, right);
        assert_eq!(entry_id(&left), "x/admin-get");
        assert_eq!(entry_id(&right), "admin-get");
    }

    #[test]
    fn test_foreign_id_is_returned_unchanged() {
        assert_eq!(entry_id("no-prefix"), "no-prefix");
        assert_eq!(entry_id("99:short/x"), "99:short/x");
        assert_eq!(entry_id("abc:users/x"), "abc:users/x");
    }

    #[test]
    fn test_search_body_scopes_to_collection() {
        let query = TermsQuery::new("key", OneOrMany::One("u1".into()));
        let body = search_body(&users(), &query, 25);
        assert_eq!(body["size"], 25);
        assert_eq!(body["track_total_hits"], true);
        assert_eq!(
            body["query"]["bool"]["filter"][0],
            json!({ "term": { "collection": "p_users" } })
        );
        assert_eq!(body["query"]["bool"]["filter"][1], query.to_json());
    }

    #[test]
    fn test_bulk_body_lines() {
        let collection = users();
        let document = EntryDocument::new("u1".into(), "admin");
        let actions = vec![
            BulkAction::Create {
                collection: collection.clone(),
                id: document.id(),
                document,
            },
            BulkAction::Delete {
                collection,
                id: "u1-guest".into(),
            },
        ];

        let body = bulk_body(&actions).unwrap();
        let lines: Vec<Value> = body
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert!(body.ends_with('\n'));
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            json!({ "create": { "_index": "acl", "_id": "7:p_users/u1-admin" } })
        );
        assert_eq!(
            lines[1],
            json!({ "collection": "p_users", "key": "u1", "value": "admin" })
        );
        assert_eq!(
            lines[2],
            json!({ "delete": { "_index": "acl", "_id": "7:p_users/u1-guest" } })
        );
    }

    #[test]
    fn test_search_response_both_total_shapes() {
        let modern: SearchResponse = serde_json::from_value(json!({
            "hits": {
                "total": { "value": 15, "relation": "eq" },
                "hits": [
                    { "_id": "7:p_users/u1-a", "_source": { "collection": "p_users", "key": "u1", "value": "a" } }
                ]
            }
        }))
        .unwrap();
        assert_eq!(modern.hits.total.value(), 15);
        assert_eq!(modern.hits.hits[0].source.entry.value, "a");

        let legacy: SearchResponse =
            serde_json::from_value(json!({ "hits": { "total": 3, "hits": [] } })).unwrap();
        assert_eq!(legacy.hits.total.value(), 3);
    }

    #[test]
    fn test_numeric_key_in_source() {
        let hit: Hit = serde_json::from_value(json!({
            "_source": { "collection": "users", "key": 42, "value": "x" }
        }))
        .unwrap();
        assert_eq!(hit.source.entry.key, crate::value::EntryKey::Int(42));
    }

    #[test]
    fn test_bulk_response_outcomes() {
        let response: BulkResponse = serde_json::from_value(json!({
            "took": 3,
            "errors": true,
            "items": [
                { "create": { "_id": "5:users/u1-a", "status": 201 } },
                { "create": { "_id": "5:users/u1-b", "status": 409,
                              "error": { "type": "version_conflict_engine_exception" } } },
                { "delete": { "_id": "5:users/u1-c", "status": 200 } },
                { "delete": { "_id": "5:users/u1-d", "status": 404 } },
                { "create": { "_id": "5:users/u1-e", "status": 400,
                              "error": { "type": "mapper_parsing_exception" } } }
            ]
        }))
        .unwrap();

        let items = response.into_items();
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].outcome, BulkOutcome::Created);
        assert_eq!(items[1].outcome, BulkOutcome::Conflict);
        assert_eq!(items[2].outcome, BulkOutcome::Deleted);
        assert_eq!(items[3].outcome, BulkOutcome::NotFound);
        assert_eq!(items[4].id, "u1-e");
        match &items[4].outcome {
            BulkOutcome::Failed(reason) => assert!(reason.contains("mapper_parsing_exception")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_index_template_maps_keywords() {
        let template = index_template("acl");
        assert_eq!(template["index_patterns"], json!(["acl"]));
        let properties = &template["template"]["mappings"]["properties"];
        for field in ["collection", "key", "value"] {
            assert_eq!(properties[field]["type"], "keyword");
        }
    }
}
