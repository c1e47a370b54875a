// src/lambda/mod.rs

//! AWS Lambda handler for catalog ingestion.
//!
//! One invocation runs one ingest: fetch the requested root, crawl it,
//! and stream every visited document into the search index. The upstream
//! workflow engine (the CSV-splitting ETL driver among others) invokes
//! this handler with the same [`IngestRequest`] payload the CLI accepts.

use std::sync::Arc;

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::config;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::index::{HttpSearchIndex, SearchIndex};
use crate::models::IngestRequest;
use crate::pipeline::{self, IngestSummary};

/// Lambda response payload.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    /// Whether the ingest completed without a fatal error
    pub success: bool,

    /// Documents accepted by the index
    pub documents_indexed: usize,

    /// Documents skipped (failed children, drops, rejections)
    pub documents_skipped: usize,

    /// Error message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl Default for IngestResponse {
    fn default() -> Self {
        Self {
            success: false,
            documents_indexed: 0,
            documents_skipped: 0,
            error: None,
            execution_time_ms: 0,
        }
    }
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<IngestRequest>,
) -> std::result::Result<IngestResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();

    info!(
        root = %request.root,
        recursive = request.recursive,
        collections_only = request.collections_only,
        "Starting ingest"
    );

    match run(&request).await {
        Ok(summary) => {
            let response = IngestResponse {
                success: true,
                documents_indexed: summary.documents_written,
                documents_skipped: summary.skipped(),
                execution_time_ms: start.elapsed().as_millis() as u64,
                error: None,
            };
            info!(
                "Ingest completed: {} indexed, {} skipped in {}ms",
                response.documents_indexed, response.documents_skipped, response.execution_time_ms
            );
            Ok(response)
        }
        Err(e) => {
            error!("Ingest failed: {e}");
            Ok(IngestResponse {
                success: false,
                error: Some(e.to_string()),
                execution_time_ms: start.elapsed().as_millis() as u64,
                ..Default::default()
            })
        }
    }
}

/// Internal ingest logic.
async fn run(request: &IngestRequest) -> Result<IngestSummary> {
    let config = config::from_env();
    config.validate()?;

    let fetcher = Arc::new(Fetcher::from_config(&config.fetch).await?);
    let index: Arc<dyn SearchIndex> = Arc::new(HttpSearchIndex::from_config(&config.index)?);

    pipeline::run_ingest(request, fetcher, index, &config).await
}
