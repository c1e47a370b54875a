// src/models/mod.rs

//! Domain models for the ingest application.

mod config;
mod document;
mod operation;

// Re-export all public types
pub use config::{Config, FetchConfig, IndexConfig, SinkConfig};
pub use document::{Document, Link, NodeKind};
pub use operation::{WriteAction, WriteOperation};

/// Parameters of one ingest run.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct IngestRequest {
    /// Root catalog location: local path, `s3://` URI or HTTP(S) URL
    pub root: String,

    /// Expand children below the root (default: true)
    #[serde(default = "default_recursive")]
    pub recursive: bool,

    /// Stop descending once a Collection is reached (default: false)
    #[serde(default)]
    pub collections_only: bool,
}

fn default_recursive() -> bool {
    true
}

impl IngestRequest {
    /// A recursive ingest of the given root with default policies.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            recursive: true,
            collections_only: false,
        }
    }
}
