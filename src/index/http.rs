// src/index/http.rs

//! HTTP search index client.
//!
//! Speaks the Elasticsearch-compatible REST surface: `PUT /{index}` for
//! preparation and `POST /_bulk` with an NDJSON body for writes. The
//! client is explicitly constructed and injected; there is no ambient
//! process-wide connection.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{AppError, Result};
use crate::index::{BulkFailure, BulkReport, SearchIndex};
use crate::models::{IndexConfig, WriteAction, WriteOperation};

/// Search index backend over HTTP.
pub struct HttpSearchIndex {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSearchIndex {
    /// Create a client against the given endpoint.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from index configuration.
    pub fn from_config(config: &IndexConfig) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::new(client, config.url.clone()))
    }

    /// Serialize operations into an NDJSON bulk body: one action line per
    /// operation, followed by the document body for non-delete actions.
    fn bulk_body(operations: &[WriteOperation]) -> String {
        let mut body = String::new();
        for op in operations {
            let action = json!({
                (op.action.as_str()): {
                    "_index": op.index,
                    "_type": op.doc_type,
                    "_id": op.id,
                }
            });
            body.push_str(&action.to_string());
            body.push('\n');
            if op.action != WriteAction::Delete {
                body.push_str(&op.body.to_string());
                body.push('\n');
            }
        }
        body
    }
}

/// Wire shape of a bulk response.
#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    items: Vec<serde_json::Map<String, Value>>,
}

#[async_trait::async_trait]
impl SearchIndex for HttpSearchIndex {
    async fn prepare(&self, index: &str) -> Result<()> {
        let url = format!("{}/{}", self.base_url, index);
        let response = self.client.put(&url).json(&json!({})).send().await?;

        if response.status().is_success() {
            debug!(index, "Index created");
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 400 && body.contains("resource_already_exists_exception") {
            debug!(index, "Index already exists");
            return Ok(());
        }

        Err(AppError::Index(format!(
            "create index {index} failed: {status}: {body}"
        )))
    }

    async fn bulk_write(&self, operations: &[WriteOperation]) -> Result<BulkReport> {
        let url = format!("{}/_bulk", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("content-type", "application/x-ndjson")
            .body(Self::bulk_body(operations))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Index(format!("bulk write failed: {status}: {body}")));
        }

        let parsed: BulkResponse = response.json().await?;
        let mut report = BulkReport::default();
        for item in &parsed.items {
            // Each entry is keyed by its action verb.
            let Some((_, result)) = item.iter().next() else {
                continue;
            };
            let status = result
                .get("status")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u16;
            if (200..300).contains(&status) {
                report.successful += 1;
            } else {
                report.failures.push(BulkFailure {
                    id: result
                        .get("_id")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    index: result
                        .get("_index")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    status,
                    reason: result
                        .get("error")
                        .map(Value::to_string)
                        .unwrap_or_else(|| "unknown".to_string()),
                });
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_ops() -> Vec<WriteOperation> {
        vec![
            WriteOperation::upsert("collections", "c1", json!({"id": "c1"})),
            WriteOperation::upsert("items", "i1", json!({"id": "i1"})),
        ]
    }

    #[test]
    fn test_bulk_body_shape() {
        let body = HttpSearchIndex::bulk_body(&sample_ops());
        let lines: Vec<_> = body.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains(r#""_index":"collections""#));
        assert!(lines[0].contains(r#""_id":"c1""#));
        assert_eq!(lines[1], r#"{"id":"c1"}"#);
    }

    #[tokio::test]
    async fn test_prepare_existing_index_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/collections"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"error":{"type":"resource_already_exists_exception"}}"#,
            ))
            .mount(&server)
            .await;

        let index = HttpSearchIndex::new(reqwest::Client::new(), server.uri());
        assert!(index.prepare("collections").await.is_ok());
    }

    #[tokio::test]
    async fn test_bulk_write_reports_rejections() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/_bulk"))
            .and(body_string_contains(r#""_id":"c1""#))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": true,
                "items": [
                    {"index": {"_index": "collections", "_id": "c1", "status": 201}},
                    {"index": {"_index": "items", "_id": "i1", "status": 429,
                               "error": {"type": "es_rejected_execution_exception"}}}
                ]
            })))
            .mount(&server)
            .await;

        let index = HttpSearchIndex::new(reqwest::Client::new(), server.uri());
        let report = index.bulk_write(&sample_ops()).await.unwrap();
        assert_eq!(report.successful, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, "i1");
        assert_eq!(report.failures[0].status, 429);
    }

    #[tokio::test]
    async fn test_bulk_write_http_failure_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/_bulk"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let index = HttpSearchIndex::new(reqwest::Client::new(), server.uri());
        assert!(index.bulk_write(&sample_ops()).await.is_err());
    }
}
