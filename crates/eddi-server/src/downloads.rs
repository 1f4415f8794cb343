//! Download artifacts
//!
//! Definitions and execution plans offered to the user are written here by
//! the relay and served back by file name.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ServerError, ServerResult};

/// Directory holding download artifacts
#[derive(Debug, Clone)]
pub struct DownloadDir {
    root: PathBuf,
}

impl DownloadDir {
    /// Use `root` for artifacts
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory in use
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory if missing
    pub async fn ensure(&self) -> ServerResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Write `value` as JSON under `file_name`
    pub async fn write_json(&self, file_name: &str, value: &Value) -> ServerResult<PathBuf> {
        let path = self.resolve(file_name)?;
        self.ensure().await?;
        let body = serde_json::to_vec(value)?;
        tokio::fs::write(&path, body).await?;
        debug!(path = %path.display(), "Download artifact written");
        Ok(path)
    }

    /// Read an artifact back
    pub async fn read(&self, file_name: &str) -> ServerResult<Vec<u8>> {
        let path = self.resolve(file_name)?;
        Ok(tokio::fs::read(&path).await?)
    }

    fn resolve(&self, file_name: &str) -> ServerResult<PathBuf> {
        if !is_safe_file_name(file_name) {
            return Err(ServerError::NotFound("File".to_string()));
        }
        Ok(self.root.join(file_name))
    }
}

/// Plain file names only: no separators, no parent references
pub fn is_safe_file_name(file_name: &str) -> bool {
    !file_name.is_empty()
        && !file_name.contains('/')
        && !file_name.contains('\\')
        && !file_name.contains("..")
}

/// Content type chosen from the file extension
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("json") => "application/json",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("sql") => "application/sql",
        Some("html") => "text/html",
        _ => "application/octet-stream",
    }
}
