// src/backends/pdf.rs
use crate::extractors::page::{PageDocument, PageLibrary, TextItem};
use crate::extractors::DocumentFormat;
use crate::utils::error::ExtractError;
use async_trait::async_trait;

const PARSER_VERSION: &str = "lopdf-0.32";

/// Page-document library backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLibrary;

/// An opened PDF. Dropped at the end of the extraction call.
#[derive(Debug)]
pub struct PdfDocument {
    inner: lopdf::Document,
    page_count: u32,
}

#[async_trait]
impl PageLibrary for PdfLibrary {
    type Document = PdfDocument;

    fn version(&self) -> &str {
        PARSER_VERSION
    }

    async fn open(&self, bytes: &[u8]) -> Result<PdfDocument, ExtractError> {
        // Parsing the object table is CPU-bound, keep it off the async workers
        let owned = bytes.to_vec();
        let inner = tokio::task::spawn_blocking(move || lopdf::Document::load_mem(&owned))
            .await
            .map_err(|e| ExtractError::open(DocumentFormat::Pdf, e))?
            .map_err(|e| ExtractError::open(DocumentFormat::Pdf, e))?;

        let page_count = inner.get_pages().len() as u32;
        tracing::debug!("Opened PDF with {} pages", page_count);
        Ok(PdfDocument { inner, page_count })
    }
}

#[async_trait]
impl PageDocument for PdfDocument {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    async fn text_content(&self, page_number: u32) -> Result<Vec<TextItem>, ExtractError> {
        if page_number == 0 || page_number > self.page_count {
            return Err(ExtractError::PageRead {
                page: page_number,
                reason: format!("document has {} pages", self.page_count),
            });
        }

        let text = self
            .inner
            .extract_text(&[page_number])
            .map_err(|e| ExtractError::PageRead {
                page: page_number,
                reason: e.to_string(),
            })?;

        // lopdf separates text objects with newlines; each line is one run
        Ok(text.lines().map(|line| TextItem::Run(line.to_string())).collect())
    }
}
