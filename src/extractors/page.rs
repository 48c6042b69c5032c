// src/extractors/page.rs

// --- Imports ---
use crate::extractors::normalize::normalize_text;
use crate::source::SourceFile;
use crate::utils::error::ExtractError;
use async_trait::async_trait;

/// One entry of a page's text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextItem {
    /// A fragment of visible text.
    Run(String),
    /// An entry with no textual payload (marked-content boundaries, graphics).
    Marker,
}

/// A library able to open page-oriented documents from raw bytes.
#[async_trait]
pub trait PageLibrary: Send + Sync {
    type Document: PageDocument;

    /// Version identifier of the underlying parser.
    fn version(&self) -> &str;

    async fn open(&self, bytes: &[u8]) -> Result<Self::Document, ExtractError>;
}

/// An opened page-oriented document. Pages are numbered from 1.
#[async_trait]
pub trait PageDocument: Send + Sync {
    fn page_count(&self) -> u32;

    /// Text content of one page. Failures are `ExtractError::PageRead`.
    async fn text_content(&self, page_number: u32) -> Result<Vec<TextItem>, ExtractError>;
}

/// Pulls the text of every page, in order, and normalizes it.
///
/// Any page that cannot be read aborts the whole extraction.
pub async fn extract_pages<L: PageLibrary>(library: &L, file: &SourceFile) -> Result<String, ExtractError> {
    tracing::debug!("Opening page document {} with parser version {}", file.name, library.version());
    let document = library.open(&file.bytes).await?;
    let page_count = document.page_count();
    tracing::info!("Extracting {} pages from {}", page_count, file.name);

    let mut full_text = String::new();
    for page_number in 1..=page_count {
        let items = document.text_content(page_number).await?;
        let runs: Vec<&str> = items
            .iter()
            .filter_map(|item| match item {
                TextItem::Run(text) => Some(text.as_str()),
                TextItem::Marker => None,
            })
            .collect();
        tracing::debug!("Page {}: {} text runs ({} items)", page_number, runs.len(), items.len());

        full_text.push_str(&runs.join(" "));
        full_text.push(' ');
    }

    Ok(normalize_text(&full_text))
}
