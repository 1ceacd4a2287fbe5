use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{GraphError, MalformedReason, Result};

use super::model::ShelfStatus;

const GRAPH_CONTAINER: &str = "graph_data";

/// One source record as found in the document. Fields are looked up with
/// [`RawNode::resolve`], which hides the several places a value may live.
#[derive(Clone, Debug, PartialEq)]
pub struct RawNode(Map<String, Value>);

impl RawNode {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Looks `names` up on the record, then under `data`, then under
    /// `data.credits`. Within a level the names are tried in order and the
    /// first non-empty value wins.
    pub fn resolve(&self, names: &[&str]) -> Option<&Value> {
        let data = self.0.get("data").and_then(Value::as_object);
        let credits = data
            .and_then(|data| data.get("credits"))
            .and_then(Value::as_object);

        [Some(&self.0), data, credits]
            .into_iter()
            .flatten()
            .find_map(|level| {
                names
                    .iter()
                    .filter_map(|name| level.get(*name))
                    .find(|value| !is_empty_value(value))
            })
    }

    pub fn resolve_str(&self, names: &[&str]) -> Option<&str> {
        let data = self.0.get("data").and_then(Value::as_object);
        let credits = data
            .and_then(|data| data.get("credits"))
            .and_then(Value::as_object);

        [Some(&self.0), data, credits]
            .into_iter()
            .flatten()
            .find_map(|level| {
                names
                    .iter()
                    .filter_map(|name| level.get(*name).and_then(Value::as_str))
                    .map(str::trim)
                    .find(|value| !value.is_empty())
            })
    }

    /// Canonical JSON text of the record, used to derive ids for nameless records.
    pub fn fingerprint(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }

    /// The record's own `id`, accepting numeric ids as well.
    pub fn id(&self) -> Option<String> {
        self.0.get("id").and_then(endpoint_id)
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Accepts `"id"`, `42` or `{ "id": ... }` and returns the id as a string.
pub fn endpoint_id(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_owned())
        }
        Value::Number(number) => Some(number.to_string()),
        Value::Object(map) => match map.get("id") {
            Some(Value::Object(_)) | None => None,
            Some(inner) => endpoint_id(inner),
        },
        _ => None,
    }
}

#[derive(Clone, Debug, Deserialize)]
struct RawLinkFields {
    #[serde(default)]
    source: Value,
    #[serde(default)]
    target: Value,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    value: Option<f64>,
}

/// A source edge with its endpoints already reduced to plain string ids.
#[derive(Clone, Debug, PartialEq)]
pub struct RawLink {
    pub source: String,
    pub target: String,
    pub kind: Option<String>,
    pub value: Option<f64>,
}

impl RawLink {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: None,
            value: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        let fields = RawLinkFields::deserialize(value).ok()?;
        Some(Self {
            source: endpoint_id(&fields.source)?,
            target: endpoint_id(&fields.target)?,
            kind: fields
                .kind
                .map(|kind| kind.trim().to_owned())
                .filter(|kind| !kind.is_empty()),
            value: fields.value.filter(|value| value.is_finite()),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub fetch_time: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawTag {
    pub name: String,
    pub items: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawDocument {
    pub nodes: Vec<RawNode>,
    pub links: Vec<RawLink>,
    pub metadata: Option<DocumentMetadata>,
    pub shelf_items: HashMap<String, ShelfStatus>,
    pub tags: Vec<RawTag>,
    /// Entries of `nodes`/`links` that were not objects or lacked endpoints.
    pub unreadable_entries: usize,
}

pub fn parse_document(raw: &str) -> Result<RawDocument> {
    let parsed: Value = serde_json::from_str(raw)
        .map_err(|error| GraphError::from(MalformedReason::InvalidJson(error.to_string())))?;
    RawDocument::from_value(parsed)
}

impl RawDocument {
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut root) = value else {
            return Err(MalformedReason::NotAnObject.into());
        };

        let Some(Value::Object(mut container)) = root.remove(GRAPH_CONTAINER) else {
            return Err(MalformedReason::MissingGraphData.into());
        };

        let Some(Value::Array(raw_nodes)) = container.remove("nodes") else {
            return Err(MalformedReason::InvalidNodes.into());
        };

        let raw_links = match container.remove("links") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(links)) => links,
            Some(_) => return Err(MalformedReason::InvalidLinks.into()),
        };

        let mut unreadable_entries = 0usize;
        let mut nodes = Vec::with_capacity(raw_nodes.len());
        for value in raw_nodes {
            match RawNode::from_value(value) {
                Some(node) => nodes.push(node),
                None => unreadable_entries += 1,
            }
        }

        let mut links = Vec::with_capacity(raw_links.len());
        for value in &raw_links {
            match RawLink::from_value(value) {
                Some(link) => links.push(link),
                None => unreadable_entries += 1,
            }
        }

        if unreadable_entries > 0 {
            warn!(unreadable_entries, "skipped unreadable graph entries");
        }

        let metadata = root
            .get("metadata")
            .filter(|value| !value.is_null())
            .and_then(|value| match DocumentMetadata::deserialize(value) {
                Ok(metadata) => Some(metadata),
                Err(error) => {
                    warn!(%error, "ignoring unreadable metadata section");
                    None
                }
            });

        Ok(Self {
            nodes,
            links,
            metadata,
            shelf_items: root
                .get("shelf_items")
                .map(parse_shelf_items)
                .unwrap_or_default(),
            tags: root.get("tags").map(parse_tags).unwrap_or_default(),
            unreadable_entries,
        })
    }
}

fn parse_shelf_items(value: &Value) -> HashMap<String, ShelfStatus> {
    let mut statuses = HashMap::new();
    let Some(sections) = value.as_object() else {
        return statuses;
    };

    for (shelf, items) in sections {
        let Some(status) = ShelfStatus::parse(shelf) else {
            warn!(shelf = shelf.as_str(), "ignoring unknown shelf section");
            continue;
        };

        for id in items.as_array().into_iter().flatten().filter_map(item_id) {
            statuses.entry(id).or_insert(status);
        }
    }

    statuses
}

fn item_id(value: &Value) -> Option<String> {
    endpoint_id(value).or_else(|| value.get("item").and_then(endpoint_id))
}

fn parse_tags(value: &Value) -> Vec<RawTag> {
    value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|entry| match entry {
            Value::String(name) => Some(RawTag {
                name: name.trim().to_owned(),
                items: Vec::new(),
            }),
            Value::Object(map) => {
                let name = map
                    .get("name")
                    .or_else(|| map.get("id"))
                    .and_then(Value::as_str)?
                    .trim()
                    .to_owned();
                let items = map
                    .get("items")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                    .filter_map(item_id)
                    .collect();
                Some(RawTag { name, items })
            }
            _ => None,
        })
        .filter(|tag| !tag.name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn node(value: Value) -> RawNode {
        RawNode::from_value(value).expect("object")
    }

    #[test]
    fn resolve_prefers_direct_then_data_then_credits() {
        let record = node(json!({
            "id": "m1",
            "director": "",
            "data": {
                "directors": ["Michael Mann"],
                "credits": { "directors": ["Someone Else"], "cast": ["Al Pacino"] }
            }
        }));

        assert_eq!(
            record.resolve(&["directors", "director"]),
            Some(&json!(["Michael Mann"]))
        );
        assert_eq!(record.resolve(&["cast"]), Some(&json!(["Al Pacino"])));
        assert_eq!(record.resolve(&["authors"]), None);
    }

    #[test]
    fn endpoints_accept_strings_numbers_and_objects() {
        assert_eq!(endpoint_id(&json!("m1")), Some("m1".to_owned()));
        assert_eq!(endpoint_id(&json!(7)), Some("7".to_owned()));
        assert_eq!(endpoint_id(&json!({ "id": "m2" })), Some("m2".to_owned()));
        assert_eq!(endpoint_id(&json!({ "name": "m2" })), None);
        assert_eq!(endpoint_id(&json!("  ")), None);
    }

    #[test]
    fn empty_object_is_missing_graph_data() {
        assert_eq!(
            RawDocument::from_value(json!({})),
            Err(GraphError::MalformedInput(MalformedReason::MissingGraphData))
        );
        assert_eq!(
            RawDocument::from_value(json!([])),
            Err(GraphError::MalformedInput(MalformedReason::NotAnObject))
        );
        assert_eq!(
            RawDocument::from_value(json!({ "graph_data": { "links": [] } })),
            Err(GraphError::MalformedInput(MalformedReason::InvalidNodes))
        );
        assert!(matches!(
            parse_document("{ not json"),
            Err(GraphError::MalformedInput(MalformedReason::InvalidJson(_)))
        ));
    }

    #[test]
    fn optional_sections_are_read_leniently() {
        let document = RawDocument::from_value(json!({
            "graph_data": {
                "nodes": [{ "id": "m1" }, "junk"],
                "links": [{ "source": { "id": "a" }, "target": "m1", "type": "directed" }, { "source": "a" }]
            },
            "metadata": { "username": "reader" },
            "shelf_items": { "complete": ["m1", { "id": "m2" }], "later": ["m3"] },
            "tags": ["noir", { "name": "heist", "items": ["m1"] }, 12]
        }))
        .expect("valid document");

        assert_eq!(document.nodes.len(), 1);
        assert_eq!(
            document.links,
            vec![RawLink::new("a", "m1").with_kind("directed")]
        );
        assert_eq!(document.unreadable_entries, 2);
        assert_eq!(
            document.metadata.and_then(|metadata| metadata.username),
            Some("reader".to_owned())
        );
        assert_eq!(document.shelf_items.get("m2"), Some(&ShelfStatus::Complete));
        assert!(!document.shelf_items.contains_key("m3"));
        assert_eq!(document.tags.len(), 2);
        assert_eq!(document.tags[1].items, vec!["m1".to_owned()]);
    }
}
