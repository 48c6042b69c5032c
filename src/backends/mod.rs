// src/backends/mod.rs
// Concrete document libraries behind the extractor traits
pub mod epub;
pub mod pdf;

pub use epub::{EpubBook, EpubLibrary};
pub use pdf::{PdfDocument, PdfLibrary};
