// src/models/document.rs

//! STAC document model.
//!
//! A [`Document`] is created once, at parse time, from the raw bytes a
//! fetch returned. The node kind is assigned here and never re-derived:
//! a document with an `extent` is a Collection, one with a `geometry` is
//! an Item, and anything else is a pure-navigation Catalog.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};

/// Link relation carried by a catalog document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    /// Relation type (`self`, `parent`, `root`, `child`, `item`, ...)
    pub rel: String,

    /// Link target, absolute or relative
    pub href: String,
}

/// Kind of a catalog node, tagged once at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Pure navigation document describing only children
    Catalog,
    /// Themed set of Items with a bounding extent
    Collection,
    /// Leaf document describing one geospatial asset
    Item,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Catalog => "catalog",
            NodeKind::Collection => "collection",
            NodeKind::Item => "item",
        }
    }
}

/// A parsed catalog document. Immutable once emitted downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document identifier
    pub id: String,

    /// Node kind, assigned at parse time
    pub kind: NodeKind,

    /// Links in document order
    pub links: Vec<Link>,

    /// The raw document body, written to the index as-is
    pub payload: Value,
}

impl Document {
    /// Parse a document from raw bytes.
    ///
    /// `location` only labels the error when the bytes are not a usable
    /// document.
    pub fn from_slice(location: &str, bytes: &[u8]) -> Result<Self> {
        let payload: Value =
            serde_json::from_slice(bytes).map_err(|e| AppError::parse(location, e))?;

        if !payload.is_object() {
            return Err(AppError::parse(location, "document is not a JSON object"));
        }

        let id = payload
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AppError::parse(location, "document has no id"))?;

        let kind = if payload.get("extent").is_some() {
            NodeKind::Collection
        } else if payload.get("geometry").is_some() {
            NodeKind::Item
        } else {
            NodeKind::Catalog
        };

        let links = Self::extract_links(&payload);

        Ok(Self {
            id,
            kind,
            links,
            payload,
        })
    }

    /// Pull `{rel, href}` pairs out of the `links` array.
    ///
    /// Entries missing either field are skipped rather than failing the
    /// whole document.
    fn extract_links(payload: &Value) -> Vec<Link> {
        payload
            .get("links")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        let rel = entry.get("rel")?.as_str()?;
                        let href = entry.get("href")?.as_str()?;
                        Some(Link {
                            rel: rel.to_string(),
                            href: href.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The canonical `self` reference, present iff exactly one `self` link
    /// exists.
    pub fn canonical_self(&self) -> Option<&str> {
        let mut selves = self.links.iter().filter(|l| l.rel == "self");
        let first = selves.next()?;
        if selves.next().is_some() {
            return None;
        }
        Some(&first.href)
    }

    /// Links that lead to descendants (`child` and `item` relations).
    pub fn child_links(&self) -> impl Iterator<Item = &Link> {
        self.links
            .iter()
            .filter(|l| l.rel == "child" || l.rel == "item")
    }
}
