// src/config.rs

//! Configuration loading utilities.
//!
//! The CLI reads a TOML file; Lambda deployments carry no filesystem
//! config and override defaults from environment variables instead.

use std::path::Path;

use crate::models::Config;

/// Environment variables recognized by [`from_env`].
const ENV_SEARCH_URL: &str = "SEARCH_URL";
const ENV_COLLECTIONS_INDEX: &str = "COLLECTIONS_INDEX";
const ENV_ITEMS_INDEX: &str = "ITEMS_INDEX";
const ENV_BATCH_SIZE: &str = "INGEST_BATCH_SIZE";
const ENV_FETCH_TIMEOUT: &str = "INGEST_FETCH_TIMEOUT_SECS";

/// Load configuration from a TOML file, falling back to defaults.
pub fn load_or_default(path: &Path) -> Config {
    Config::load_or_default(path)
}

/// Build configuration from the process environment.
pub fn from_env() -> Config {
    from_vars(|key| std::env::var(key).ok())
}

fn from_vars(var: impl Fn(&str) -> Option<String>) -> Config {
    let mut config = Config::default();

    if let Some(url) = var(ENV_SEARCH_URL) {
        config.index.url = url;
    }
    if let Some(name) = var(ENV_COLLECTIONS_INDEX) {
        config.index.collections = name;
    }
    if let Some(name) = var(ENV_ITEMS_INDEX) {
        config.index.items = name;
    }
    if let Some(size) = var(ENV_BATCH_SIZE).and_then(|v| v.parse().ok()) {
        config.sink.batch_size = size;
    }
    if let Some(secs) = var(ENV_FETCH_TIMEOUT).and_then(|v| v.parse().ok()) {
        config.fetch.timeout_secs = secs;
    }

    config
}
