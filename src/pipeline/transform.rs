// src/pipeline/transform.rs

//! Document-to-write-operation transform.
//!
//! Pure and total over well-formed documents. Malformed documents are
//! dropped with a logged warning; a drop is never a pipeline error.

use tracing::warn;

use crate::models::{Document, IndexConfig, NodeKind, WriteOperation};

/// Maps crawled documents onto index write operations.
pub struct Transformer {
    collections_index: String,
    items_index: String,
}

impl Transformer {
    /// Create a transformer routing documents per the index configuration.
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            collections_index: config.collections.clone(),
            items_index: config.items.clone(),
        }
    }

    /// Produce the write operation for one document, or `None` to drop it.
    ///
    /// The action is always an upsert keyed by the document's own id, so
    /// re-ingesting the same catalog is a no-op modulo content changes.
    pub fn transform(&self, document: Document) -> Option<WriteOperation> {
        if document.id.trim().is_empty() {
            warn!(kind = document.kind.as_str(), "Dropping document without id");
            return None;
        }
        if !document.payload.is_object() {
            warn!(id = %document.id, "Dropping document with non-object payload");
            return None;
        }

        let index = match document.kind {
            NodeKind::Catalog | NodeKind::Collection => &self.collections_index,
            NodeKind::Item => &self.items_index,
        };
        Some(WriteOperation::upsert(
            index.clone(),
            document.id,
            document.payload,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WriteAction;
    use serde_json::json;

    fn transformer() -> Transformer {
        Transformer::new(&IndexConfig::default())
    }

    fn parse(value: serde_json::Value) -> Document {
        Document::from_slice("test://doc", &serde_json::to_vec(&value).unwrap()).unwrap()
    }

    #[test]
    fn test_routes_by_kind() {
        let collection = transformer()
            .transform(parse(json!({"id": "c1", "extent": {}})))
            .unwrap();
        assert_eq!(collection.index, "collections");

        let item = transformer()
            .transform(parse(json!({"id": "i1", "geometry": {}})))
            .unwrap();
        assert_eq!(item.index, "items");

        let catalog = transformer()
            .transform(parse(json!({"id": "root"})))
            .unwrap();
        assert_eq!(catalog.index, "collections");
    }

    #[test]
    fn test_action_is_upsert_keyed_by_id() {
        let op = transformer()
            .transform(parse(json!({"id": "c1", "extent": {}})))
            .unwrap();
        assert_eq!(op.action, WriteAction::Index);
        assert_eq!(op.id, "c1");
    }

    #[test]
    fn test_transform_is_deterministic() {
        let doc = parse(json!({"id": "i1", "geometry": {"type": "Point"}}));
        let first = transformer().transform(doc.clone()).unwrap();
        let second = transformer().transform(doc).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_blank_id_is_dropped() {
        let mut doc = parse(json!({"id": "x"}));
        doc.id = "  ".to_string();
        assert!(transformer().transform(doc).is_none());
    }
}
