// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Fetching behavior settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Sink batching and retry settings
    #[serde(default)]
    pub sink: SinkConfig,

    /// Search index settings
    #[serde(default)]
    pub index: IndexConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if self.fetch.max_in_flight == 0 {
            return Err(AppError::validation("fetch.max_in_flight must be > 0"));
        }
        if self.fetch.child_concurrency == 0 {
            return Err(AppError::validation("fetch.child_concurrency must be > 0"));
        }
        if self.sink.batch_size == 0 {
            return Err(AppError::validation("sink.batch_size must be > 0"));
        }
        if self.sink.channel_capacity == 0 {
            return Err(AppError::validation("sink.channel_capacity must be > 0"));
        }
        if self.index.url.trim().is_empty() {
            return Err(AppError::validation("index.url is empty"));
        }
        if self.index.collections.trim().is_empty() || self.index.items.trim().is_empty() {
            return Err(AppError::validation("index names must not be empty"));
        }
        Ok(())
    }
}

/// Fetching behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-fetch timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Global cap on concurrent fetches across all sources
    #[serde(default = "defaults::max_in_flight")]
    pub max_in_flight: usize,

    /// Cap on concurrent child fetches under a single parent node
    #[serde(default = "defaults::child_concurrency")]
    pub child_concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_in_flight: defaults::max_in_flight(),
            child_concurrency: defaults::child_concurrency(),
        }
    }
}

/// Sink batching and retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Maximum operations per bulk write
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,

    /// Maximum time a non-empty batch is held before flushing, in ms
    #[serde(default = "defaults::flush_interval")]
    pub flush_interval_ms: u64,

    /// Retry attempts for a failed bulk write before aborting the pipeline
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Base backoff between retries, in ms (grows linearly per attempt)
    #[serde(default = "defaults::retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Capacity of the pipeline channels feeding the sink
    #[serde(default = "defaults::channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            batch_size: defaults::batch_size(),
            flush_interval_ms: defaults::flush_interval(),
            max_retries: defaults::max_retries(),
            retry_backoff_ms: defaults::retry_backoff(),
            channel_capacity: defaults::channel_capacity(),
        }
    }
}

/// Search index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Base URL of the search index endpoint
    #[serde(default = "defaults::index_url")]
    pub url: String,

    /// Index receiving Catalog and Collection documents
    #[serde(default = "defaults::collections_index")]
    pub collections: String,

    /// Index receiving Item documents
    #[serde(default = "defaults::items_index")]
    pub items: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: defaults::index_url(),
            collections: defaults::collections_index(),
            items: defaults::items_index(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        format!("stac-ingest/{}", env!("CARGO_PKG_VERSION"))
    }

    pub fn timeout() -> u64 {
        30
    }

    pub fn max_in_flight() -> usize {
        500
    }

    pub fn child_concurrency() -> usize {
        10
    }

    pub fn batch_size() -> usize {
        500
    }

    pub fn flush_interval() -> u64 {
        1000
    }

    pub fn max_retries() -> u32 {
        3
    }

    pub fn retry_backoff() -> u64 {
        500
    }

    pub fn channel_capacity() -> usize {
        1024
    }

    pub fn index_url() -> String {
        "http://localhost:9200".to_string()
    }

    pub fn collections_index() -> String {
        "collections".to_string()
    }

    pub fn items_index() -> String {
        "items".to_string()
    }
}
