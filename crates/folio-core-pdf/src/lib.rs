#![warn(missing_docs)]
//! Folio Core PDF - Fixed-layout export for folio-core documents
//!
//! # Overview
//!
//! Renders a page map (or a serialized document blob) into a PDF file. Every editor page starts
//! a new sheet; content that does not fit continues on additional sheets. Text uses the standard
//! base-14 fonts, images referenced by the markup are embedded as RGB XObjects, and hyperlinks
//! become link annotations.
//!
//! ```text
//! PageMap ──markup──▶ RichText ──layout──▶ Sheets ──writer──▶ PDF bytes
//! ```
//!
//! # Example
//!
//! ```rust
//! use folio_core::PageMap;
//! use folio_core_pdf::{PdfOptions, render_pages};
//!
//! let mut pages = PageMap::new();
//! pages.insert(1, "<p>Hello</p>".to_string());
//! pages.insert(2, "<p><b>World</b></p>".to_string());
//!
//! let pdf = render_pages(&pages, &PdfOptions::default()).unwrap();
//! assert!(pdf.starts_with(b"%PDF-1.4"));
//! ```

pub mod font;
pub mod layout;
pub mod options;
pub mod writer;

mod error;

pub use error::PdfError;
pub use font::{BaseFont, Family};
pub use layout::{Item, LayoutEngine, Sheet, TextStyle};
pub use options::PdfOptions;
pub use writer::PdfWriter;

use folio_core::{DocumentBlob, PageMap, from_markup};
use std::path::Path;
use tracing::info;

/// Lay out every page of `pages` onto sheets without serializing them.
pub fn layout_pages(pages: &PageMap, options: &PdfOptions) -> Result<Vec<Sheet>, PdfError> {
    let mut engine = LayoutEngine::new(options);
    for (&page, markup) in pages {
        let doc = from_markup(markup).map_err(|source| PdfError::Markup { page, source })?;
        engine.layout_page(&doc);
    }
    Ok(engine.finish())
}

/// Render `pages` in ascending page order.
pub fn render_pages(pages: &PageMap, options: &PdfOptions) -> Result<Vec<u8>, PdfError> {
    let sheets = layout_pages(pages, options)?;
    Ok(PdfWriter::new(options).write(&sheets))
}

/// Render a serialized multi-page document.
pub fn render_blob(blob: &DocumentBlob, options: &PdfOptions) -> Result<Vec<u8>, PdfError> {
    render_pages(&blob.split_pages()?, options)
}

/// Render `pages` and write the result to `path`.
///
/// Nothing is written when rendering fails.
pub fn write_pdf(path: &Path, pages: &PageMap, options: &PdfOptions) -> Result<(), PdfError> {
    let bytes = render_pages(pages, options)?;
    std::fs::write(path, &bytes).map_err(|source| PdfError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), pages = pages.len(), bytes = bytes.len(), "pdf written");
    Ok(())
}
