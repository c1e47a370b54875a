// src/fetch/local.rs

//! Local filesystem source.

use std::path::Path;

use crate::error::{AppError, Result};

/// Read a file's bytes.
pub async fn read_file(path: &Path) -> Result<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::fetch(
            path.display().to_string(),
            "file not found",
        )),
        Err(e) => Err(AppError::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("item.json");
        std::fs::write(&path, b"{}").unwrap();
        assert_eq!(read_file(&path).await.unwrap(), b"{}");
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let err = read_file(Path::new("/no/such/file.json")).await.unwrap_err();
        assert!(matches!(err, AppError::Fetch { .. }));
    }
}
