// src/services/crawler.rs

//! Catalog tree crawler.
//!
//! Drives an explicit-stack depth-first traversal over the linked catalog
//! tree. The stack and the visited set are owned by the single crawl
//! loop; the only concurrency is the bounded fan-out when fetching one
//! node's children, and every one of those fetches is caught
//! independently so a broken child costs only its own subtree.
//!
//! Emission order follows DFS discovery. A parent is always emitted
//! before its expansion is attempted; sibling order is not guaranteed,
//! since sibling fetches race.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::fetch::{Fetcher, Location};
use crate::models::{Document, FetchConfig, IngestRequest, NodeKind};
use crate::services::resolver;

/// Counters from one crawl run.
#[derive(Debug, Default)]
pub struct CrawlStats {
    /// Documents emitted into the pipeline
    pub documents_emitted: usize,
    /// Children that failed to fetch or parse and were skipped
    pub child_failures: usize,
}

/// A pending node: the parsed document plus where it was fetched from.
struct CrawlNode {
    document: Document,
    source: Location,
}

/// Walks a catalog tree and emits every visited document.
pub struct CatalogCrawler {
    fetcher: Arc<Fetcher>,
    child_concurrency: usize,
    cancelled: Arc<AtomicBool>,
}

impl CatalogCrawler {
    /// Create a crawler over the given fetcher.
    pub fn new(fetcher: Arc<Fetcher>, config: &FetchConfig) -> Self {
        Self {
            fetcher,
            child_concurrency: config.child_concurrency.max(1),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops the crawl at the next visiting iteration.
    ///
    /// Fetches already in flight finish and are discarded.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Crawl from the request's root, emitting documents into `output`.
    ///
    /// Root fetch/parse failures are fatal; everything below the root is
    /// recoverable per node. The output stream closes when this returns.
    pub async fn run(
        &self,
        request: &IngestRequest,
        output: mpsc::Sender<Document>,
    ) -> Result<CrawlStats> {
        // Rooting
        let root_location = Location::parse(&request.root)?;
        let local_origin = root_location.is_local();

        let bytes = self
            .fetcher
            .fetch(&root_location)
            .await
            .map_err(|e| AppError::root_fetch(root_location.to_string(), e))?;
        let root = Document::from_slice(&root_location.to_string(), &bytes)
            .map_err(|e| AppError::root_fetch(root_location.to_string(), e))?;

        info!(root = %root_location, id = %root.id, "Starting crawl");

        let mut visited: HashSet<String> = HashSet::new();
        let mut stack: Vec<CrawlNode> = Vec::new();
        let mut stats = CrawlStats::default();

        // The root may lack a self link; its invocation location is its
        // identity then.
        let root_key = root
            .canonical_self()
            .map(str::to_string)
            .unwrap_or_else(|| root_location.to_string());
        visited.insert(root_key);
        stack.push(CrawlNode {
            document: root,
            source: root_location,
        });

        // Visiting
        while let Some(node) = stack.pop() {
            if self.cancelled.load(Ordering::Relaxed) {
                info!("Crawl cancelled; closing the stream early");
                break;
            }

            let expand = request.recursive
                && !(request.collections_only && node.document.kind == NodeKind::Collection);
            let targets = if expand {
                resolver::child_locations(&node.document, &node.source, local_origin)
            } else {
                Vec::new()
            };
            let parent_id = node.document.id.clone();

            debug!(id = %parent_id, kind = node.document.kind.as_str(), "Visiting");
            stats.documents_emitted += 1;
            if output.send(node.document).await.is_err() {
                return Err(AppError::StreamClosed(
                    "document consumer dropped mid-crawl".to_string(),
                ));
            }

            if targets.is_empty() {
                continue;
            }

            let fetched: Vec<(Location, Result<Document>)> = stream::iter(targets)
                .map(|location| {
                    let fetcher = Arc::clone(&self.fetcher);
                    async move {
                        let result = Self::fetch_and_parse(&fetcher, &location).await;
                        (location, result)
                    }
                })
                .buffer_unordered(self.child_concurrency)
                .collect()
                .await;

            for (location, result) in fetched {
                match result {
                    Ok(child) => {
                        if request.collections_only && child.kind == NodeKind::Item {
                            continue;
                        }
                        let key = match Self::visit_key(&child, &location) {
                            Ok(key) => key,
                            Err(e) => {
                                warn!(parent = %parent_id, "Skipping child: {e}");
                                stats.child_failures += 1;
                                continue;
                            }
                        };
                        if visited.insert(key) {
                            stack.push(CrawlNode {
                                document: child,
                                source: location,
                            });
                        }
                    }
                    Err(e) => {
                        warn!(parent = %parent_id, "Skipping child: {e}");
                        stats.child_failures += 1;
                    }
                }
            }
        }

        // Draining: dropping `output` closes the stream downstream.
        info!(
            emitted = stats.documents_emitted,
            failed = stats.child_failures,
            "Crawl finished"
        );
        Ok(stats)
    }

    async fn fetch_and_parse(fetcher: &Fetcher, location: &Location) -> Result<Document> {
        let bytes = fetcher.fetch(location).await?;
        Document::from_slice(&location.to_string(), &bytes)
    }

    /// Canonical visited-set key.
    ///
    /// Remote documents must carry exactly one `self` link; local files
    /// fall back to their own path.
    fn visit_key(document: &Document, location: &Location) -> Result<String> {
        match document.canonical_self() {
            Some(href) => Ok(href.to_string()),
            None if location.is_local() => Ok(location.to_string()),
            None => Err(AppError::parse(
                location.to_string(),
                "remote document lacks a single self link",
            )),
        }
    }
}
