use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

/// One search hit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source", default)]
    pub source: Option<Map<String, Value>>,
    #[serde(default)]
    pub highlight: HashMap<String, Vec<String>>,
}

impl Hit {
    /// String value of a top-level `_source` field, if present.
    #[must_use]
    pub fn source_str(&self, field: &str) -> Option<&str> {
        self.source
            .as_ref()
            .and_then(|s| s.get(field))
            .and_then(Value::as_str)
    }

    /// Highlight fragments returned for `field`; empty when none.
    #[must_use]
    pub fn highlights(&self, field: &str) -> &[String] {
        self.highlight.get(field).map_or(&[], Vec::as_slice)
    }
}

/// One page of a scroll traversal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollPage {
    pub scroll_id: Option<String>,
    pub hits: Vec<Hit>,
}

/// Partial-document update keyed by record id.
///
/// Only the fields in `doc` are touched; the store merges them into the
/// existing record.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOp {
    pub id: String,
    pub doc: Map<String, Value>,
}

impl UpdateOp {
    #[must_use]
    pub fn new(id: impl Into<String>, doc: Map<String, Value>) -> Self {
        Self { id: id.into(), doc }
    }
}

/// A single bulk item the store rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkFailure {
    pub id: Option<String>,
    pub status: u16,
    pub reason: String,
}

/// Result of one bulk request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    pub success: usize,
    pub failed: Vec<BulkFailure>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(rename = "_scroll_id", default)]
    pub scroll_id: Option<String>,
    pub hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HitsEnvelope {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteByQueryResponse {
    #[serde(default)]
    pub deleted: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IndexResponse {
    #[serde(rename = "_id")]
    pub id: String,
}
