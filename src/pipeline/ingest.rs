// src/pipeline/ingest.rs

//! Ingest pipeline wiring.
//!
//! Crawler → Transform → Sink over bounded channels. The crawl loop runs
//! on the caller's task; transform and sink are spawned. Completion
//! resolves only after the sink confirms its final flush, never when the
//! crawl stack merely empties.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::info;

use crate::error::{AppError, Result};
use crate::fetch::Fetcher;
use crate::index::SearchIndex;
use crate::models::{Config, Document, IngestRequest, WriteOperation};
use crate::pipeline::sink::BulkSink;
use crate::pipeline::transform::Transformer;
use crate::services::CatalogCrawler;

/// User-visible outcome of one ingest run.
#[derive(Debug)]
pub struct IngestSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the final flush completed
    pub finished_at: DateTime<Utc>,
    /// Documents the crawler emitted
    pub documents_emitted: usize,
    /// Operations the index accepted
    pub documents_written: usize,
    /// Per-item rejections inside successful bulk responses
    pub documents_rejected: usize,
    /// Documents dropped by the transform
    pub documents_dropped: usize,
    /// Children skipped because their fetch or parse failed
    pub child_failures: usize,
    /// Bulk calls executed
    pub batches_flushed: usize,
}

impl IngestSummary {
    /// Documents that were reachable but did not land in the index.
    pub fn skipped(&self) -> usize {
        self.documents_rejected + self.documents_dropped + self.child_failures
    }
}

/// Run one ingest: crawl from the root and stream every visited document
/// into the search index.
///
/// Returns the first fatal error (root fetch/parse, or sink exhaustion),
/// or a summary whose skip counts surface partial success.
pub async fn run_ingest(
    request: &IngestRequest,
    fetcher: Arc<Fetcher>,
    index: Arc<dyn SearchIndex>,
    config: &Config,
) -> Result<IngestSummary> {
    let started_at = Utc::now();

    index.prepare(&config.index.collections).await?;
    index.prepare(&config.index.items).await?;

    let (doc_tx, mut doc_rx) = mpsc::channel::<Document>(config.sink.channel_capacity);
    let (op_tx, op_rx) = mpsc::channel::<WriteOperation>(config.sink.channel_capacity);

    let transformer = Transformer::new(&config.index);
    let transform_task = tokio::spawn(async move {
        let mut dropped = 0usize;
        while let Some(document) = doc_rx.recv().await {
            match transformer.transform(document) {
                Some(operation) => {
                    if op_tx.send(operation).await.is_err() {
                        break;
                    }
                }
                None => dropped += 1,
            }
        }
        dropped
    });

    let sink = BulkSink::new(Arc::clone(&index), config.sink.clone());
    let sink_task = tokio::spawn(async move { sink.run(op_rx).await });

    let crawler = CatalogCrawler::new(fetcher, &config.fetch);
    let crawl_result = crawler.run(request, doc_tx).await;

    let documents_dropped = transform_task
        .await
        .map_err(|e| AppError::Internal(format!("transform stage terminated: {e}")))?;
    let sink_result = sink_task
        .await
        .map_err(|e| AppError::Internal(format!("sink stage terminated: {e}")))?;

    // When the sink died, the crawler only saw a closed channel; the
    // sink's own error is the root cause.
    let stats = match crawl_result {
        Ok(stats) => stats,
        Err(crawl_error) => {
            return Err(match sink_result {
                Err(sink_error) => sink_error,
                Ok(_) => crawl_error,
            });
        }
    };
    let report = sink_result?;

    let summary = IngestSummary {
        started_at,
        finished_at: Utc::now(),
        documents_emitted: stats.documents_emitted,
        documents_written: report.documents_written,
        documents_rejected: report.documents_rejected,
        documents_dropped,
        child_failures: stats.child_failures,
        batches_flushed: report.batches_flushed,
    };
    info!(
        emitted = summary.documents_emitted,
        written = summary.documents_written,
        skipped = summary.skipped(),
        batches = summary.batches_flushed,
        "Ingest complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::BulkReport;
    use crate::models::FetchConfig;
    use serde_json::json;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;

    /// In-memory index double keyed like the real thing: (index, id).
    #[derive(Default)]
    struct MemoryIndex {
        prepared: Mutex<Vec<String>>,
        documents: Mutex<HashMap<(String, String), serde_json::Value>>,
        batch_sizes: Mutex<Vec<usize>>,
        fail_all: bool,
    }

    impl MemoryIndex {
        fn snapshot(&self) -> HashMap<(String, String), serde_json::Value> {
            self.documents.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl SearchIndex for MemoryIndex {
        async fn prepare(&self, index: &str) -> Result<()> {
            self.prepared.lock().unwrap().push(index.to_string());
            Ok(())
        }

        async fn bulk_write(&self, operations: &[WriteOperation]) -> Result<BulkReport> {
            if self.fail_all {
                return Err(AppError::Index("index unavailable".to_string()));
            }
            self.batch_sizes.lock().unwrap().push(operations.len());
            let mut documents = self.documents.lock().unwrap();
            for op in operations {
                documents.insert((op.index.clone(), op.id.clone()), op.body.clone());
            }
            Ok(BulkReport {
                successful: operations.len(),
                failures: Vec::new(),
            })
        }
    }

    fn write_doc(dir: &Path, name: &str, value: serde_json::Value) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, serde_json::to_vec(&value).unwrap()).unwrap();
    }

    fn write_sample_tree(dir: &Path) {
        write_doc(
            dir,
            "catalog.json",
            json!({
                "id": "root",
                "links": [
                    {"rel": "child", "href": "collectionA/collection.json"},
                    {"rel": "child", "href": "collectionB/collection.json"},
                ]
            }),
        );
        write_doc(
            dir,
            "collectionA/collection.json",
            json!({
                "id": "collectionA",
                "extent": {},
                "links": [
                    {"rel": "item", "href": "items/i1.json"},
                    {"rel": "item", "href": "items/i2.json"},
                ]
            }),
        );
        write_doc(
            dir,
            "collectionA/items/i1.json",
            json!({"id": "item1", "geometry": {"type": "Point"}}),
        );
        write_doc(
            dir,
            "collectionA/items/i2.json",
            json!({"id": "item2", "geometry": {"type": "Point"}}),
        );
        write_doc(
            dir,
            "collectionB/collection.json",
            json!({"id": "collectionB", "extent": {}, "links": []}),
        );
    }

    fn test_config(batch_size: usize) -> Config {
        let mut config = Config::default();
        config.sink.batch_size = batch_size;
        config.sink.flush_interval_ms = 10_000;
        config.sink.retry_backoff_ms = 1;
        config
    }

    async fn ingest(
        dir: &Path,
        index: Arc<MemoryIndex>,
        config: &Config,
    ) -> Result<IngestSummary> {
        let fetcher = Arc::new(crate::fetch::test_fetcher(&FetchConfig::default()));
        let request = IngestRequest::new(dir.join("catalog.json").display().to_string());
        run_ingest(&request, fetcher, index as Arc<dyn SearchIndex>, config).await
    }

    #[tokio::test]
    async fn test_end_to_end_counts_and_batches() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_tree(dir.path());
        let index = Arc::new(MemoryIndex::default());

        let summary = ingest(dir.path(), Arc::clone(&index), &test_config(2))
            .await
            .unwrap();

        assert_eq!(summary.documents_emitted, 5);
        assert_eq!(summary.documents_written, 5);
        assert_eq!(summary.skipped(), 0);
        assert_eq!(summary.batches_flushed, 3);
        assert_eq!(*index.batch_sizes.lock().unwrap(), vec![2, 2, 1]);

        let prepared = index.prepared.lock().unwrap().clone();
        assert!(prepared.contains(&"collections".to_string()));
        assert!(prepared.contains(&"items".to_string()));

        let snapshot = index.snapshot();
        assert_eq!(snapshot.len(), 5);
        assert!(snapshot.contains_key(&("collections".to_string(), "root".to_string())));
        assert!(snapshot.contains_key(&("items".to_string(), "item1".to_string())));
    }

    #[tokio::test]
    async fn test_reingest_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_tree(dir.path());
        let index = Arc::new(MemoryIndex::default());
        let config = test_config(2);

        ingest(dir.path(), Arc::clone(&index), &config).await.unwrap();
        let after_first = index.snapshot();

        ingest(dir.path(), Arc::clone(&index), &config).await.unwrap();
        let after_second = index.snapshot();

        assert_eq!(after_first, after_second);
    }

    #[tokio::test]
    async fn test_sink_exhaustion_aborts_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_tree(dir.path());
        let index = Arc::new(MemoryIndex {
            fail_all: true,
            ..MemoryIndex::default()
        });

        let mut config = test_config(2);
        config.sink.max_retries = 1;

        let err = ingest(dir.path(), index, &config).await.unwrap_err();
        assert!(matches!(err, AppError::SinkExhausted { .. }));
    }

    #[tokio::test]
    async fn test_missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(MemoryIndex::default());

        let err = ingest(dir.path(), index, &test_config(2)).await.unwrap_err();
        assert!(matches!(err, AppError::RootFetch { .. }));
    }
}
