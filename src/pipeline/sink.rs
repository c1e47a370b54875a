// src/pipeline/sink.rs

//! Batched, backpressured index sink.
//!
//! Buffers write operations into a batch and flushes when the batch is
//! full or the hold timer fires, whichever comes first. One flush is
//! exactly one bulk call, and flushes are strictly serial. While a flush
//! is outstanding the sink does not receive, so the bounded input channel
//! fills and producers suspend on `send` — that is the backpressure
//! contract; the buffer can never grow past channel capacity plus one
//! batch.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::error::{AppError, Result};
use crate::index::SearchIndex;
use crate::models::{SinkConfig, WriteOperation};

/// Counters from one sink run.
#[derive(Debug, Default)]
pub struct SinkReport {
    /// Operations accepted by the index
    pub documents_written: usize,
    /// Operations rejected per item inside successful bulk responses
    pub documents_rejected: usize,
    /// Bulk calls executed
    pub batches_flushed: usize,
}

/// Consumes a write-operation stream into bulk index writes.
pub struct BulkSink {
    index: Arc<dyn SearchIndex>,
    config: SinkConfig,
}

impl BulkSink {
    /// Create a sink writing through the given index collaborator.
    pub fn new(index: Arc<dyn SearchIndex>, config: SinkConfig) -> Self {
        Self { index, config }
    }

    /// Run until the input channel closes and the final flush completes.
    pub async fn run(&self, mut input: mpsc::Receiver<WriteOperation>) -> Result<SinkReport> {
        let flush_interval = Duration::from_millis(self.config.flush_interval_ms);
        let mut batch: Vec<WriteOperation> = Vec::with_capacity(self.config.batch_size);
        let mut report = SinkReport::default();

        loop {
            // First operation of the next batch.
            match input.recv().await {
                Some(op) => batch.push(op),
                None => break,
            }

            // Fill until full, hold-timer expiry, or channel close.
            let deadline = tokio::time::sleep(flush_interval);
            tokio::pin!(deadline);
            let mut closed = false;
            while batch.len() < self.config.batch_size && !closed {
                tokio::select! {
                    maybe = input.recv() => match maybe {
                        Some(op) => batch.push(op),
                        None => closed = true,
                    },
                    _ = &mut deadline => break,
                }
            }

            self.flush(&mut batch, &mut report).await?;

            if closed {
                break;
            }
        }

        Ok(report)
    }

    /// Flush the batch as one bulk call, retrying transient failures on
    /// the same batch up to the configured attempt bound.
    async fn flush(&self, batch: &mut Vec<WriteOperation>, report: &mut SinkReport) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.index.bulk_write(batch).await {
                Ok(bulk) => {
                    for failure in &bulk.failures {
                        warn!(
                            id = %failure.id,
                            index = %failure.index,
                            status = failure.status,
                            "Index rejected document: {}",
                            failure.reason
                        );
                    }
                    report.documents_written += bulk.successful;
                    report.documents_rejected += bulk.failures.len();
                    report.batches_flushed += 1;
                    debug!(size = batch.len(), "Flushed batch");
                    batch.clear();
                    return Ok(());
                }
                Err(e) if attempt <= self.config.max_retries => {
                    warn!(attempt, "Bulk write failed, retrying: {e}");
                    let backoff = self.config.retry_backoff_ms * u64::from(attempt);
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
                Err(e) => {
                    error!(
                        written = report.documents_written,
                        "Bulk write failed after {attempt} attempt(s); \
                         {} operation(s) were durably written before this failure",
                        report.documents_written
                    );
                    return Err(AppError::sink_exhausted(attempt, e));
                }
            }
        }
    }
}
