// src/services/resolver.rs

//! Child link resolution.
//!
//! Catalogs mix absolute cloud URLs and locally relative filenames, so
//! resolution has to match the origin's addressing scheme: when the crawl
//! started from a local path, relative targets resolve against the node's
//! own source location; otherwise they resolve against the directory of
//! the document's `self` link.

use std::path::Path;

use tracing::warn;

use crate::error::{AppError, Result};
use crate::fetch::Location;
use crate::models::Document;

/// Compute absolute child locations for one document.
///
/// Filters links to the `child` and `item` relations. Unresolvable links
/// are logged and skipped; they never fail the document.
pub fn child_locations(document: &Document, source: &Location, local_origin: bool) -> Vec<Location> {
    let base = if local_origin {
        Some(source.clone())
    } else {
        document
            .canonical_self()
            .and_then(|href| Location::parse(href).ok())
    };

    let mut locations = Vec::new();
    for link in document.child_links() {
        if is_absolute(&link.href) {
            match Location::parse(&link.href) {
                Ok(location) => locations.push(location),
                Err(e) => warn!(document = %document.id, href = %link.href, "Unusable child link: {e}"),
            }
            continue;
        }

        let Some(base) = &base else {
            warn!(
                document = %document.id,
                href = %link.href,
                "Cannot resolve relative link: document has no usable self link"
            );
            continue;
        };

        match resolve_relative(base, &link.href) {
            Ok(location) => locations.push(location),
            Err(e) => warn!(document = %document.id, href = %link.href, "Unusable child link: {e}"),
        }
    }
    locations
}

fn is_absolute(href: &str) -> bool {
    href.starts_with("s3://") || href.starts_with("http://") || href.starts_with("https://")
}

/// Resolve a relative href against the directory of a base location.
fn resolve_relative(base: &Location, href: &str) -> Result<Location> {
    match base {
        Location::Http(url) => Ok(Location::Http(url.join(href)?)),
        Location::S3 { bucket, key } => Ok(Location::S3 {
            bucket: bucket.clone(),
            key: join_key(key, href)
                .ok_or_else(|| AppError::validation(format!("link escapes bucket root: {href}")))?,
        }),
        Location::Local(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new(""));
            Ok(Location::Local(dir.join(href)))
        }
    }
}

/// Join a relative href onto an object key, treating the key's last
/// segment as a file name. Returns None if `..` climbs past the root.
fn join_key(key: &str, href: &str) -> Option<String> {
    let mut segments: Vec<&str> = key.split('/').collect();
    segments.pop();

    for part in href.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn document(links: serde_json::Value) -> Document {
        let value = json!({"id": "node", "links": links});
        Document::from_slice("test://doc", &serde_json::to_vec(&value).unwrap()).unwrap()
    }

    #[test]
    fn test_absolute_targets_pass_through() {
        let doc = document(json!([
            {"rel": "child", "href": "s3://other-bucket/sub/catalog.json"},
            {"rel": "item", "href": "https://example.com/items/i1.json"}
        ]));
        let source = Location::parse("https://example.com/catalog.json").unwrap();
        let resolved = child_locations(&doc, &source, false);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].to_string(), "s3://other-bucket/sub/catalog.json");
        assert_eq!(resolved[1].to_string(), "https://example.com/items/i1.json");
    }

    #[test]
    fn test_relative_resolves_against_self_directory() {
        let doc = document(json!([
            {"rel": "self", "href": "https://example.com/cat/collection.json"},
            {"rel": "item", "href": "items/i1.json"}
        ]));
        // Source differs from self; remote origin uses the self link.
        let source = Location::parse("https://mirror.example.com/collection.json").unwrap();
        let resolved = child_locations(&doc, &source, false);
        assert_eq!(
            resolved[0].to_string(),
            "https://example.com/cat/items/i1.json"
        );
    }

    #[test]
    fn test_relative_resolves_against_source_for_local_origin() {
        let doc = document(json!([
            {"rel": "child", "href": "collectionA/collection.json"}
        ]));
        let source = Location::Local(PathBuf::from("/data/catalog/catalog.json"));
        let resolved = child_locations(&doc, &source, true);
        assert_eq!(
            resolved[0],
            Location::Local(PathBuf::from("/data/catalog/collectionA/collection.json"))
        );
    }

    #[test]
    fn test_relative_without_self_is_skipped_for_remote_origin() {
        let doc = document(json!([
            {"rel": "child", "href": "collectionA/collection.json"}
        ]));
        let source = Location::parse("https://example.com/catalog.json").unwrap();
        assert!(child_locations(&doc, &source, false).is_empty());
    }

    #[test]
    fn test_s3_key_join_with_parent_segments() {
        let doc = document(json!([
            {"rel": "self", "href": "s3://bucket/catalogs/a/collection.json"},
            {"rel": "child", "href": "../b/collection.json"}
        ]));
        let source = Location::parse("s3://bucket/catalogs/a/collection.json").unwrap();
        let resolved = child_locations(&doc, &source, false);
        assert_eq!(
            resolved[0].to_string(),
            "s3://bucket/catalogs/b/collection.json"
        );
    }

    #[test]
    fn test_navigation_links_are_ignored() {
        let doc = document(json!([
            {"rel": "self", "href": "https://example.com/catalog.json"},
            {"rel": "parent", "href": "https://example.com/parent.json"},
            {"rel": "root", "href": "https://example.com/root.json"}
        ]));
        let source = Location::parse("https://example.com/catalog.json").unwrap();
        assert!(child_locations(&doc, &source, false).is_empty());
    }
}
