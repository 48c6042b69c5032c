// src/extractors/content.rs

// --- Imports ---
use crate::utils::error::SectionLoadError;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

// --- CSS Selectors (Lazy Static) ---
static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("body").expect("Failed to compile BODY_SELECTOR")
});

/// The shapes a loaded archive section can arrive in.
#[derive(Debug)]
pub enum SectionContent {
    /// Markup still in string form; parsed as HTML on coercion.
    RawMarkup(String),
    /// An already-parsed HTML document.
    MarkupTree(Html),
    /// XML source for a non-HTML document; parsed on coercion.
    XmlTree(String),
    /// Anything else. Contributes no text.
    Unrecognized,
}

impl SectionContent {
    /// Coerces the content into plain text (DOM `textContent` semantics).
    ///
    /// `locator` is only used to label parse failures.
    pub fn into_text(self, locator: &str) -> Result<String, SectionLoadError> {
        match self {
            SectionContent::RawMarkup(markup) => {
                let document = Html::parse_document(&markup);
                Ok(body_text(&document).unwrap_or_default())
            }
            SectionContent::MarkupTree(document) => Ok(body_text(&document)
                .unwrap_or_else(|| element_text(document.root_element()))),
            SectionContent::XmlTree(source) => xml_text(&source, locator),
            SectionContent::Unrecognized => Ok(String::new()),
        }
    }
}

fn body_text(document: &Html) -> Option<String> {
    document.select(&BODY_SELECTOR).next().map(element_text)
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

fn xml_text(source: &str, locator: &str) -> Result<String, SectionLoadError> {
    let document = roxmltree::Document::parse(source).map_err(|e| SectionLoadError::Malformed {
        locator: locator.to_string(),
        reason: e.to_string(),
    })?;

    // Prefer a body element (XHTML in any namespace), otherwise the document element
    let root = document.root_element();
    let target = root
        .descendants()
        .find(|node| node.is_element() && node.tag_name().name().eq_ignore_ascii_case("body"))
        .unwrap_or(root);

    Ok(target
        .descendants()
        .filter(|node| node.is_text())
        .filter_map(|node| node.text())
        .collect())
}
