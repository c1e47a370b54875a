// src/fetch/s3.rs

//! S3 object source.

use aws_sdk_s3::Client;

use crate::error::{AppError, Result};

/// GET an object and return its bytes.
pub async fn get_object(client: &Client, bucket: &str, key: &str) -> Result<Vec<u8>> {
    let result = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await;

    match result {
        Ok(output) => {
            let bytes = output
                .body
                .collect()
                .await
                .map_err(|e| AppError::S3(e.to_string()))?;
            Ok(bytes.into_bytes().to_vec())
        }
        Err(err) => {
            let service_err = err.into_service_error();
            if service_err.is_no_such_key() {
                Err(AppError::S3(format!(
                    "object not found: s3://{bucket}/{key}"
                )))
            } else {
                Err(AppError::S3(service_err.to_string()))
            }
        }
    }
}
