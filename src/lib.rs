// src/lib.rs
//! Plain-text extraction for PDF and EPUB documents.
//!
//! A file is routed by its name suffix to a page-oriented (PDF) or
//! archive-based (EPUB) extractor; both feed a shared normalizer that
//! collapses whitespace and repeated terminal punctuation.
pub mod backends;
pub mod extractors;
pub mod source;
pub mod utils;

pub use extractors::{normalize_text, DocumentFormat, Extractor, SUPPORTED_EXTENSIONS};
pub use source::SourceFile;
pub use utils::{ExtractError, SectionLoadError};

fn default_extractor() -> Extractor {
    Extractor::default()
}

/// Detects the format from the file name and extracts its text.
pub async fn parse_file(file: &SourceFile) -> Result<String, ExtractError> {
    default_extractor().extract(file).await
}

/// Extracts text from a PDF, page by page.
pub async fn parse_pdf(file: &SourceFile) -> Result<String, ExtractError> {
    default_extractor().extract_pdf(file).await
}

/// Extracts text from an EPUB, section by section along its spine.
pub async fn parse_epub(file: &SourceFile) -> Result<String, ExtractError> {
    default_extractor().extract_epub(file).await
}

/// Comma-separated, dot-prefixed list of recognized suffixes.
pub fn get_supported_extensions() -> &'static str {
    SUPPORTED_EXTENSIONS
}
