// src/index/mod.rs

//! Search index collaborator.
//!
//! The sink depends only on this trait: `prepare` to make sure an index
//! and its mapping exist, `bulk_write` to execute one batch. Query
//! execution lives outside the ingest core.

pub mod http;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::WriteOperation;

// Re-export for convenience
pub use http::HttpSearchIndex;

/// One rejected operation inside an otherwise-successful bulk response.
#[derive(Debug, Clone)]
pub struct BulkFailure {
    /// Document id of the rejected operation
    pub id: String,
    /// Index the operation targeted
    pub index: String,
    /// Per-item status code
    pub status: u16,
    /// Reason reported by the index
    pub reason: String,
}

/// Per-item result report of one bulk write.
#[derive(Debug, Clone, Default)]
pub struct BulkReport {
    /// Operations accepted by the index
    pub successful: usize,
    /// Operations rejected by the index
    pub failures: Vec<BulkFailure>,
}

/// Trait for search index backends.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Ensure the index and its mapping exist. Idempotent.
    async fn prepare(&self, index: &str) -> Result<()>;

    /// Execute one batch as a single bulk request.
    ///
    /// An `Err` means the request as a whole failed (and may be retried);
    /// per-item rejections come back inside the report.
    async fn bulk_write(&self, operations: &[WriteOperation]) -> Result<BulkReport>;
}
