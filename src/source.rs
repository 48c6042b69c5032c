// src/source.rs
use std::path::Path;

use crate::utils::error::ExtractError;

/// A user-supplied document: raw bytes plus the display name used to pick a format.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Reads a file from disk. The display name is the path's final component.
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        tracing::debug!("Loaded {} ({} bytes)", path.display(), bytes.len());
        Ok(Self::new(name, bytes))
    }
}
