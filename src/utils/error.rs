// src/utils/error.rs
use thiserror::Error;

use crate::extractors::DocumentFormat;

// Errors that reach the caller of an extraction call
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to open {format} document: {reason}")]
    DocumentOpen {
        format: DocumentFormat,
        reason: String,
    },

    #[error("Failed to read page {page}: {reason}")]
    PageRead { page: u32, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    pub fn open(format: DocumentFormat, reason: impl ToString) -> Self {
        ExtractError::DocumentOpen {
            format,
            reason: reason.to_string(),
        }
    }
}

/// Failure loading or interpreting a single archive section.
/// Recovered inside the archive extractor; never returned to callers.
#[derive(Error, Debug)]
pub enum SectionLoadError {
    #[error("Section resource not found: {0}")]
    MissingResource(String),

    #[error("Malformed section {locator}: {reason}")]
    Malformed { locator: String, reason: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Processing failed: {0}")]
    Processing(String),
}
