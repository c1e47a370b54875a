// src/models/operation.rs

//! Index write operations produced by the transform stage.

use serde_json::Value;

/// Bulk action verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    /// Idempotent upsert keyed by document id
    Index,
    /// Partial update of an existing document
    Update,
    /// Remove a document
    Delete,
}

impl WriteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteAction::Index => "index",
            WriteAction::Update => "update",
            WriteAction::Delete => "delete",
        }
    }
}

/// One write against the search index.
///
/// Produced 1:1 (or 1:0 on drop) per crawled document.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOperation {
    /// Bulk action
    pub action: WriteAction,

    /// Target index name
    pub index: String,

    /// Mapping type
    pub doc_type: String,

    /// Document identifier the upsert is keyed on
    pub id: String,

    /// Document body written to the index
    pub body: Value,
}

impl WriteOperation {
    /// Create an upsert for the given index and document.
    pub fn upsert(index: impl Into<String>, id: impl Into<String>, body: Value) -> Self {
        Self {
            action: WriteAction::Index,
            index: index.into(),
            doc_type: "_doc".to_string(),
            id: id.into(),
            body,
        }
    }
}
