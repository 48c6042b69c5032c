// src/extractors/mod.rs
pub mod archive;
pub mod content;
pub mod lookup;
pub mod normalize;
pub mod page;

use std::fmt;

use crate::backends::{EpubLibrary, PdfLibrary};
use crate::source::SourceFile;
use crate::utils::error::ExtractError;

use archive::{extract_sections, ArchiveLibrary};
use page::{extract_pages, PageLibrary};

// Re-export key extraction types for convenience
pub use archive::{ArchiveDocument, SpineItem};
pub use content::SectionContent;
pub use normalize::normalize_text;
pub use page::{PageDocument, TextItem};

/// Recognized suffixes, in the order they are advertised.
pub const SUPPORTED_EXTENSIONS: &str = ".pdf,.epub";

/// The document formats the pipeline knows how to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Epub,
}

impl DocumentFormat {
    /// Picks a format from the file name suffix alone (case-insensitive).
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        [DocumentFormat::Pdf, DocumentFormat::Epub]
            .into_iter()
            .find(|format| lower.ends_with(format.extension()))
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => ".pdf",
            DocumentFormat::Epub => ".epub",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "PDF"),
            DocumentFormat::Epub => write!(f, "EPUB"),
        }
    }
}

/// Routes a file to the extractor for its format.
///
/// Holds no per-call state; one `Extractor` can serve concurrent calls.
pub struct Extractor<P = PdfLibrary, A = EpubLibrary> {
    pages: P,
    archives: A,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(PdfLibrary, EpubLibrary)
    }
}

impl<P: PageLibrary, A: ArchiveLibrary> Extractor<P, A> {
    pub fn new(pages: P, archives: A) -> Self {
        Self { pages, archives }
    }

    /// Extracts normalized text, choosing the extractor by file name suffix.
    pub async fn extract(&self, file: &SourceFile) -> Result<String, ExtractError> {
        match DocumentFormat::from_file_name(&file.name) {
            Some(DocumentFormat::Pdf) => self.extract_pdf(file).await,
            Some(DocumentFormat::Epub) => self.extract_epub(file).await,
            None => {
                tracing::warn!("Rejecting {}: unsupported file type", file.name);
                Err(ExtractError::UnsupportedFormat(file.name.to_lowercase()))
            }
        }
    }

    /// Page-oriented extraction, regardless of file name.
    pub async fn extract_pdf(&self, file: &SourceFile) -> Result<String, ExtractError> {
        tracing::info!("Parsing PDF {} ({} bytes)", file.name, file.bytes.len());
        let text = extract_pages(&self.pages, file).await?;
        tracing::info!("Extracted {} chars from {}", text.chars().count(), file.name);
        Ok(text)
    }

    /// Archive-based extraction, regardless of file name.
    pub async fn extract_epub(&self, file: &SourceFile) -> Result<String, ExtractError> {
        tracing::info!("Parsing EPUB {} ({} bytes)", file.name, file.bytes.len());
        let text = extract_sections(&self.archives, file).await?;
        tracing::info!("Extracted {} chars from {}", text.chars().count(), file.name);
        Ok(text)
    }
}
