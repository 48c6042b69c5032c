// src/extractors/archive.rs

// --- Imports ---
use crate::extractors::content::SectionContent;
use crate::extractors::lookup::{first_resolved, Accessor};
use crate::extractors::normalize::normalize_text;
use crate::source::SourceFile;
use crate::utils::error::{ExtractError, SectionLoadError};
use async_trait::async_trait;

/// One entry of an archive's spine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpineItem {
    pub href: Option<String>,
    pub url: Option<String>,
}

impl SpineItem {
    fn href(&self) -> Option<String> {
        self.href.clone()
    }

    fn url(&self) -> Option<String> {
        self.url.clone()
    }
}

const LOCATOR_ACCESSORS: &[Accessor<SpineItem, String>] = &[SpineItem::href, SpineItem::url];

/// A library able to open archive-based documents from raw bytes.
#[async_trait]
pub trait ArchiveLibrary: Send + Sync {
    type Document: ArchiveDocument;

    async fn open(&self, bytes: &[u8]) -> Result<Self::Document, ExtractError>;
}

/// An opened archive document.
#[async_trait]
pub trait ArchiveDocument: Send + Sync {
    /// Resolves once the document's metadata is available.
    async fn ready(&mut self) -> Result<(), ExtractError>;

    /// Resolves once the spine has been fully resolved. Called after `ready`.
    async fn spine_ready(&mut self) -> Result<(), ExtractError>;

    /// The spine as the document declares it.
    fn spine_items(&self) -> Option<Vec<SpineItem>>;

    /// An alternate reading order used when the primary spine is absent.
    fn spine_fallback_items(&self) -> Option<Vec<SpineItem>> {
        None
    }

    /// Loads one section's content by locator.
    async fn load(&mut self, locator: &str) -> Result<SectionContent, SectionLoadError>;
}

fn resolve_spine<D: ArchiveDocument>(document: &D) -> Vec<SpineItem> {
    let accessors: [Accessor<D, Vec<SpineItem>>; 2] = [D::spine_items, D::spine_fallback_items];
    first_resolved(document, &accessors).unwrap_or_default()
}

/// Pulls the text of every spine section, in order, and normalizes it.
///
/// A section that fails to load is logged and skipped; the rest still extract.
pub async fn extract_sections<L: ArchiveLibrary>(library: &L, file: &SourceFile) -> Result<String, ExtractError> {
    let mut document = library.open(&file.bytes).await?;
    document.ready().await?;
    document.spine_ready().await?;

    let spine = resolve_spine(&document);
    tracing::info!("Extracting {} spine sections from {}", spine.len(), file.name);

    let mut full_text = String::new();
    for (index, item) in spine.iter().enumerate() {
        let Some(locator) = first_resolved(item, LOCATOR_ACCESSORS) else {
            tracing::warn!("Spine item {} in {} has no locator, skipping", index, file.name);
            continue;
        };

        match load_section_text(&mut document, &locator).await {
            Ok(text) => {
                tracing::debug!("Section {} ({}): {} chars", index, locator, text.len());
                full_text.push_str(&text);
                full_text.push(' ');
            }
            Err(e) => {
                tracing::warn!("Could not load section {} ({}) of {}: {}", index, locator, file.name, e);
            }
        }
    }

    Ok(normalize_text(&full_text))
}

async fn load_section_text<D: ArchiveDocument>(document: &mut D, locator: &str) -> Result<String, SectionLoadError> {
    let content = document.load(locator).await?;
    content.into_text(locator)
}
