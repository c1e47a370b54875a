//! Pipeline stages for catalog ingestion.
//!
//! - `ingest`: wires Crawler → Transform → Sink and owns completion
//! - `transform`: maps one document to one index write operation
//! - `sink`: batches operations into serial bulk writes

pub mod ingest;
pub mod sink;
pub mod transform;

pub use ingest::{IngestSummary, run_ingest};
pub use sink::{BulkSink, SinkReport};
pub use transform::Transformer;
