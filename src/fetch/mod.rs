// src/fetch/mod.rs

//! Concurrency-bounded fetch abstraction.
//!
//! A [`Location`] names where a document lives: an S3 object, an HTTP(S)
//! URL, or a local file. The [`Fetcher`] resolves any of them to bytes.
//! Every call passes through one shared semaphore, so the total number of
//! reads in flight is capped regardless of source; excess callers queue.
//! Each call carries its own timeout, so one hung remote resource loses
//! only its own subtree.

pub mod http;
pub mod local;
pub mod s3;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::FetchConfig;

/// Where a document lives, classified by the shape of its reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// HTTP(S) URL
    Http(Url),
    /// S3 object
    S3 { bucket: String, key: String },
    /// Local filesystem path
    Local(PathBuf),
}

impl Location {
    /// Classify a raw reference: `s3://bucket/key`, `http(s)://...`,
    /// anything else is a local path.
    pub fn parse(raw: &str) -> Result<Self> {
        if let Some(rest) = raw.strip_prefix("s3://") {
            let (bucket, key) = rest
                .split_once('/')
                .ok_or_else(|| AppError::validation(format!("S3 URI has no key: {raw}")))?;
            if bucket.is_empty() || key.is_empty() {
                return Err(AppError::validation(format!("Malformed S3 URI: {raw}")));
            }
            return Ok(Self::S3 {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }

        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Ok(Self::Http(Url::parse(raw)?));
        }

        Ok(Self::Local(PathBuf::from(raw)))
    }

    /// Whether this location is a local path.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(url) => write!(f, "{url}"),
            Self::S3 { bucket, key } => write!(f, "s3://{bucket}/{key}"),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fetches documents from any [`Location`] under a global concurrency cap.
pub struct Fetcher {
    http: reqwest::Client,
    s3: aws_sdk_s3::Client,
    limiter: Arc<Semaphore>,
    timeout: Duration,
}

impl Fetcher {
    /// Create a fetcher with explicitly constructed clients.
    pub fn new(http: reqwest::Client, s3: aws_sdk_s3::Client, config: &FetchConfig) -> Self {
        Self {
            http,
            s3,
            limiter: Arc::new(Semaphore::new(config.max_in_flight)),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Create a fetcher from configuration and ambient AWS credentials.
    pub async fn from_config(config: &FetchConfig) -> Result<Self> {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let s3 = aws_sdk_s3::Client::new(&aws_config);
        let http = http::create_client(config)?;
        Ok(Self::new(http, s3, config))
    }

    /// Fetch the bytes behind a location.
    ///
    /// The returned error always carries the location and cause; callers
    /// decide whether it is fatal (root) or recoverable (child).
    pub async fn fetch(&self, location: &Location) -> Result<Vec<u8>> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| AppError::fetch(location.to_string(), "fetch limiter closed"))?;

        let read = async {
            match location {
                Location::Http(url) => http::get_bytes(&self.http, url).await,
                Location::S3 { bucket, key } => s3::get_object(&self.s3, bucket, key).await,
                Location::Local(path) => local::read_file(path).await,
            }
        };

        match tokio::time::timeout(self.timeout, read).await {
            Ok(Ok(bytes)) => Ok(bytes),
            Ok(Err(e @ AppError::Fetch { .. })) => Err(e),
            Ok(Err(e)) => Err(AppError::fetch(location.to_string(), e)),
            Err(_) => Err(AppError::fetch(location.to_string(), "fetch timed out")),
        }
    }
}

/// Fetcher over local files and mock HTTP only; the S3 client carries a
/// static test configuration and is never actually called.
#[cfg(test)]
pub(crate) fn test_fetcher(config: &FetchConfig) -> Fetcher {
    let s3_config = aws_sdk_s3::Config::builder()
        .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
        .region(aws_sdk_s3::config::Region::new("us-east-1"))
        .build();
    Fetcher::new(
        reqwest::Client::new(),
        aws_sdk_s3::Client::from_conf(s3_config),
        config,
    )
}
