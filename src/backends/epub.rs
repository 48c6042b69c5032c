// src/backends/epub.rs

// --- Imports ---
use crate::extractors::archive::{ArchiveDocument, ArchiveLibrary, SpineItem};
use crate::extractors::content::SectionContent;
use crate::extractors::DocumentFormat;
use crate::utils::error::{ExtractError, SectionLoadError};
use async_trait::async_trait;
use epub::doc::EpubDoc;
use scraper::Html;
use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;

// Media types that can stand in for a reading order when the spine is empty
const DOCUMENT_MEDIA_TYPES: &[&str] = &[
    "application/xhtml+xml",
    "text/html",
    "application/x-dtbook+xml",
];

/// Archive-document library for EPUB files, backed by the `epub` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpubLibrary;

#[derive(Debug, Default)]
struct ResolvedSpine {
    primary: Option<Vec<SpineItem>>,
    fallback: Option<Vec<SpineItem>>,
}

/// An opened EPUB. Dropped at the end of the extraction call.
pub struct EpubBook {
    doc: EpubDoc<Cursor<Vec<u8>>>,
    // archive path -> lowercased media type
    media_types: HashMap<String, String>,
    spine: ResolvedSpine,
}

impl fmt::Debug for EpubBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EpubBook")
            .field("resources", &self.doc.resources.len())
            .field("spine", &self.doc.spine.len())
            .finish()
    }
}

#[async_trait]
impl ArchiveLibrary for EpubLibrary {
    type Document = EpubBook;

    async fn open(&self, bytes: &[u8]) -> Result<EpubBook, ExtractError> {
        // Reads container.xml and the package document up front; CPU-bound like the PDF open
        let owned = bytes.to_vec();
        let doc = tokio::task::spawn_blocking(move || EpubDoc::from_reader(Cursor::new(owned)))
            .await
            .map_err(|e| ExtractError::open(DocumentFormat::Epub, e))?
            .map_err(|e| ExtractError::open(DocumentFormat::Epub, e))?;
        tracing::debug!("Opened EPUB with {} resources", doc.resources.len());

        Ok(EpubBook {
            doc,
            media_types: HashMap::new(),
            spine: ResolvedSpine::default(),
        })
    }
}

#[async_trait]
impl ArchiveDocument for EpubBook {
    async fn ready(&mut self) -> Result<(), ExtractError> {
        if self.doc.resources.is_empty() {
            return Err(ExtractError::open(DocumentFormat::Epub, "package manifest is empty"));
        }
        self.media_types = self
            .doc
            .resources
            .values()
            .map(|(path, mime)| (archive_path(path), mime.to_lowercase()))
            .collect();
        Ok(())
    }

    async fn spine_ready(&mut self) -> Result<(), ExtractError> {
        self.spine = resolve_spine(&self.doc, &self.media_types);
        tracing::debug!(
            "Spine resolved: {} itemrefs, {} manifest documents",
            self.doc.spine.len(),
            self.spine.fallback.as_ref().map_or(0, Vec::len)
        );
        Ok(())
    }

    fn spine_items(&self) -> Option<Vec<SpineItem>> {
        self.spine.primary.clone()
    }

    fn spine_fallback_items(&self) -> Option<Vec<SpineItem>> {
        self.spine.fallback.clone()
    }

    async fn load(&mut self, locator: &str) -> Result<SectionContent, SectionLoadError> {
        // Locators are archive paths; a manifest id or a still-encoded href is retried
        let mut candidates = vec![locator.to_string()];
        if let Some((path, _)) = self.doc.resources.get(locator) {
            candidates.push(archive_path(path));
        }
        if let Ok(decoded) = urlencoding::decode(locator) {
            if decoded != locator {
                candidates.push(decoded.into_owned());
            }
        }

        for path in candidates {
            if let Some(text) = self.doc.get_resource_str_by_path(&path) {
                let media_type = self.media_types.get(&path).map(String::as_str);
                return Ok(classify(media_type, &path, text));
            }
        }

        Err(SectionLoadError::MissingResource(locator.to_string()))
    }
}

fn archive_path(path: &std::path::Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn resolve_spine(doc: &EpubDoc<Cursor<Vec<u8>>>, media_types: &HashMap<String, String>) -> ResolvedSpine {
    // An empty spine reads as absent so the manifest order can stand in
    let primary = (!doc.spine.is_empty()).then(|| {
        doc.spine
            .iter()
            .map(|idref| match doc.resources.get(idref) {
                Some((path, _)) => SpineItem {
                    href: Some(archive_path(path)),
                    url: Some(idref.clone()),
                },
                None => {
                    tracing::warn!("Spine references unknown manifest id {}", idref);
                    SpineItem {
                        href: None,
                        url: Some(idref.clone()),
                    }
                }
            })
            .collect()
    });

    let mut documents: Vec<&String> = media_types
        .iter()
        .filter(|(_, mime)| DOCUMENT_MEDIA_TYPES.contains(&mime.as_str()))
        .map(|(path, _)| path)
        .collect();
    documents.sort();
    let fallback = Some(
        documents
            .into_iter()
            .map(|path| SpineItem {
                href: Some(path.clone()),
                url: None,
            })
            .collect(),
    );

    ResolvedSpine { primary, fallback }
}

fn classify(media_type: Option<&str>, path: &str, text: String) -> SectionContent {
    match media_type {
        Some("application/xhtml+xml") => xhtml_content(text),
        Some("text/html") => SectionContent::RawMarkup(text),
        Some(mt) if mt.ends_with("+xml") || mt.ends_with("/xml") => SectionContent::XmlTree(text),
        Some(_) => SectionContent::Unrecognized,
        None => {
            let lower = path.to_lowercase();
            if lower.ends_with(".xhtml") {
                xhtml_content(text)
            } else if lower.ends_with(".htm") || lower.ends_with(".html") {
                SectionContent::MarkupTree(Html::parse_document(&text))
            } else if lower.ends_with(".xml") {
                SectionContent::XmlTree(text)
            } else {
                SectionContent::RawMarkup(text)
            }
        }
    }
}

/// XHTML is XML; only sources the XML parser rejects (HTML entities such as
/// `&nbsp;` without a DTD) go through the HTML parser.
fn xhtml_content(text: String) -> SectionContent {
    match roxmltree::Document::parse(&text) {
        Ok(_) => SectionContent::XmlTree(text),
        Err(e) => {
            tracing::debug!("XHTML section is not well-formed XML ({}), parsing as HTML", e);
            SectionContent::MarkupTree(Html::parse_document(&text))
        }
    }
}

// --- Tests ---
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::extractors::archive::extract_sections;
    use crate::source::SourceFile;
    use std::io::Write;
    use tokio_test::{assert_err, assert_ok};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const CONTAINER_PATH: &str = "META-INF/container.xml";
    const CONTAINER: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;
    const NCX: &str = r#"<?xml version="1.0"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1"><navMap/></ncx>"#;

    fn build_epub(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, body) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// A complete book: mimetype, container, package, toc, then the given chapter files.
    fn build_book(package: &str, chapters: &[(&str, &str)]) -> Vec<u8> {
        let mut entries = vec![
            ("mimetype", "application/epub+zip"),
            (CONTAINER_PATH, CONTAINER),
            ("OEBPS/content.opf", package),
            ("OEBPS/toc.ncx", NCX),
        ];
        entries.extend_from_slice(chapters);
        build_epub(&entries)
    }

    fn xhtml(body: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<html xmlns=\"http://www.w3.org/1999/xhtml\"><head><title>Not body</title></head>\n<body>\n{}\n</body></html>",
            body
        )
    }

    fn opf(manifest: &str, spine: &str) -> String {
        format!(
            r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>Test</dc:title><dc:identifier id="id">test-book</dc:identifier></metadata>
  <manifest>{}</manifest>
  <spine toc="ncx">{}</spine>
</package>"#,
            manifest, spine
        )
    }

    const MANIFEST: &str = r#"
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
    <item id="c1" href="Text/ch1.xhtml" media-type="application/xhtml+xml"/>
    <item id="c2" href="Text/chapter%202.xhtml" media-type="application/xhtml+xml"/>
    <item id="c3" href="Text/ch3.html" media-type="text/html"/>
    <item id="cover" href="Images/cover.jpg" media-type="image/jpeg"/>"#;

    pub(crate) fn sample_epub() -> Vec<u8> {
        let package = opf(MANIFEST, r#"<itemref idref="c2"/><itemref idref="c1"/><itemref idref="c3"/>"#);
        let ch1 = xhtml("<h1>One</h1>\n<p>First chapter...</p>");
        let ch2 = xhtml("<p>Second   chapter!!</p>");
        build_book(
            &package,
            &[
                ("OEBPS/Text/ch1.xhtml", &ch1),
                ("OEBPS/Text/chapter 2.xhtml", &ch2),
                ("OEBPS/Text/ch3.html", "<html><body><p>Third</p></body></html>"),
            ],
        )
    }

    fn file(bytes: Vec<u8>) -> SourceFile {
        SourceFile::new("book.epub", bytes)
    }

    #[tokio::test]
    async fn test_spine_order_and_normalization() {
        let text = assert_ok!(extract_sections(&EpubLibrary, &file(sample_epub())).await);
        assert_eq!(text, "Second chapter! One First chapter. Third");
    }

    #[tokio::test]
    async fn test_self_closing_head_elements_keep_body() {
        let package = opf(
            r#"<item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
            <item id="c1" href="c1.xhtml" media-type="application/xhtml+xml"/>"#,
            r#"<itemref idref="c1"/>"#,
        );
        let chapter = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title/><style/></head><body><p>Chapter text</p></body></html>"#;
        let bytes = build_book(&package, &[("OEBPS/c1.xhtml", chapter)]);
        let text = assert_ok!(extract_sections(&EpubLibrary, &file(bytes)).await);
        assert_eq!(text, "Chapter text");
    }

    #[tokio::test]
    async fn test_xhtml_with_html_entities_still_extracts() {
        let package = opf(
            r#"<item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
            <item id="c1" href="c1.xhtml" media-type="application/xhtml+xml"/>"#,
            r#"<itemref idref="c1"/>"#,
        );
        let chapter = xhtml("<p>Non&nbsp;breaking</p>");
        let bytes = build_book(&package, &[("OEBPS/c1.xhtml", &chapter)]);
        let text = assert_ok!(extract_sections(&EpubLibrary, &file(bytes)).await);
        assert_eq!(text, "Non breaking");
    }

    #[tokio::test]
    async fn test_missing_section_file_is_skipped() {
        let package = opf(MANIFEST, r#"<itemref idref="c1"/><itemref idref="c2"/><itemref idref="c3"/>"#);
        let ch1 = xhtml("<p>Kept one</p>");
        let bytes = build_book(
            &package,
            &[
                ("OEBPS/Text/ch1.xhtml", &ch1),
                // chapter 2 is declared but absent from the archive
                ("OEBPS/Text/ch3.html", "<p>Kept three</p>"),
            ],
        );
        let text = assert_ok!(extract_sections(&EpubLibrary, &file(bytes)).await);
        assert_eq!(text, "Kept one Kept three");
    }

    #[tokio::test]
    async fn test_unknown_idref_is_skipped() {
        let package = opf(MANIFEST, r#"<itemref idref="ghost"/><itemref idref="c1"/>"#);
        let ch1 = xhtml("<p>Real</p>");
        let bytes = build_book(&package, &[("OEBPS/Text/ch1.xhtml", &ch1)]);
        let text = assert_ok!(extract_sections(&EpubLibrary, &file(bytes)).await);
        assert_eq!(text, "Real");
    }

    #[tokio::test]
    async fn test_empty_spine_falls_back_to_manifest_documents() {
        let package = opf(MANIFEST, "");
        let ch1 = xhtml("<p>A</p>");
        let ch2 = xhtml("<p>B</p>");
        let bytes = build_book(
            &package,
            &[
                ("OEBPS/Text/ch1.xhtml", &ch1),
                ("OEBPS/Text/chapter 2.xhtml", &ch2),
                ("OEBPS/Text/ch3.html", "<p>C</p>"),
            ],
        );
        let text = assert_ok!(extract_sections(&EpubLibrary, &file(bytes)).await);
        assert_eq!(text, "A C B");
    }

    #[tokio::test]
    async fn test_no_readable_sections_is_empty_text() {
        let package = opf(r#"<item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>"#, "");
        let bytes = build_book(&package, &[]);
        let text = assert_ok!(extract_sections(&EpubLibrary, &file(bytes)).await);
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_not_a_zip_is_open_error() {
        let err = assert_err!(EpubLibrary.open(b"plain text, not an archive").await);
        assert!(matches!(err, ExtractError::DocumentOpen { format: DocumentFormat::Epub, .. }));
    }

    #[tokio::test]
    async fn test_missing_container_is_open_error() {
        let bytes = build_epub(&[("mimetype", "application/epub+zip")]);
        let err = assert_err!(extract_sections(&EpubLibrary, &file(bytes)).await);
        assert!(matches!(err, ExtractError::DocumentOpen { format: DocumentFormat::Epub, .. }));
    }

    #[tokio::test]
    async fn test_missing_package_is_open_error() {
        let bytes = build_epub(&[(CONTAINER_PATH, CONTAINER)]);
        let err = assert_err!(extract_sections(&EpubLibrary, &file(bytes)).await);
        assert!(matches!(err, ExtractError::DocumentOpen { .. }));
    }

    #[test]
    fn test_classify_by_media_type_and_extension() {
        let xml = "<html><body><p>x</p></body></html>".to_string();
        assert!(matches!(classify(Some("application/xhtml+xml"), "a", xml.clone()), SectionContent::XmlTree(_)));
        assert!(matches!(
            classify(Some("application/xhtml+xml"), "a", "<p>&nbsp;</p>".to_string()),
            SectionContent::MarkupTree(_)
        ));
        assert!(matches!(classify(Some("text/html"), "a", String::new()), SectionContent::RawMarkup(_)));
        assert!(matches!(classify(Some("application/x-dtbook+xml"), "a", String::new()), SectionContent::XmlTree(_)));
        assert!(matches!(classify(Some("image/jpeg"), "a.jpg", String::new()), SectionContent::Unrecognized));
        assert!(matches!(classify(None, "x/A.XHTML", xml), SectionContent::XmlTree(_)));
        assert!(matches!(classify(None, "x/a.html", String::new()), SectionContent::MarkupTree(_)));
        assert!(matches!(classify(None, "x/a.xml", String::new()), SectionContent::XmlTree(_)));
        assert!(matches!(classify(None, "x/a.txt", String::new()), SectionContent::RawMarkup(_)));
    }
}
