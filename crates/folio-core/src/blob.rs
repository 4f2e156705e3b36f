//! Portable document blob: every page's markup in one envelope, separated by page-break markers.
//!
//! ```text
//! <html><body>{page 1}{PAGE_BREAK_MARKER}{page 2}{PAGE_BREAK_MARKER}{page 3}</body></html>
//! ```
//!
//! Export writes each page's markup verbatim, so [`import`] of an exported blob reproduces the page
//! map exactly.

use crate::error::{LoadError, SaveError};
use crate::markup;
use crate::pages::PageMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Literal token separating pages inside a blob.
pub const PAGE_BREAK_MARKER: &str = "<div style=\"page-break-after:always;\"></div>";

/// Opening envelope.
pub const BLOB_PREFIX: &str = "<html><body>";

/// Closing envelope.
pub const BLOB_SUFFIX: &str = "</body></html>";

/// Export target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// The raw blob (round-trippable, re-editable).
    Html,
    /// Fixed-layout, print-ready output.
    Pdf,
}

impl ExportFormat {
    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// The serialized multi-page document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBlob(String);

impl DocumentBlob {
    /// Concatenate `pages` in ascending index order.
    pub fn from_pages(pages: &PageMap) -> Self {
        let mut out = String::from(BLOB_PREFIX);
        for (i, content) in pages.values().enumerate() {
            if i > 0 {
                out.push_str(PAGE_BREAK_MARKER);
            }
            out.push_str(content);
        }
        out.push_str(BLOB_SUFFIX);
        Self(out)
    }

    /// Wrap already serialized text.
    pub fn from_string(text: String) -> Self {
        Self(text)
    }

    /// The blob text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the blob text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Content between the envelope tags.
    ///
    /// Blobs written by other editors carry a full `<html><head>...<body ...>` prologue; their
    /// body content is used as-is.
    fn body(&self) -> &str {
        let trimmed = self.0.trim();
        if let Some(inner) = trimmed
            .strip_prefix(BLOB_PREFIX)
            .and_then(|s| s.strip_suffix(BLOB_SUFFIX))
        {
            return inner;
        }
        let lower = trimmed.to_ascii_lowercase();
        if let Some(open) = lower.find("<body")
            && let Some(open_end) = lower[open..].find('>')
        {
            let start = open + open_end + 1;
            let end = lower.rfind("</body>").filter(|e| *e >= start).unwrap_or(trimmed.len());
            return &trimmed[start..end];
        }
        trimmed
    }

    /// Split into pages `1..=N`, validating each page's markup.
    pub fn split_pages(&self) -> Result<PageMap, LoadError> {
        let mut pages = PageMap::new();
        for (i, content) in self.body().split(PAGE_BREAK_MARKER).enumerate() {
            let page = i as u32 + 1;
            markup::from_markup(content).map_err(|source| LoadError::Markup { page, source })?;
            pages.insert(page, content.to_string());
        }
        Ok(pages)
    }
}

/// Serialize the whole document.
pub fn export_html(pages: &PageMap) -> DocumentBlob {
    DocumentBlob::from_pages(pages)
}

/// Split a blob back into pages.
pub fn import(blob: &str) -> Result<PageMap, LoadError> {
    DocumentBlob::from_string(blob.to_string()).split_pages()
}

/// Write a blob to `path`.
pub fn write_html(path: &Path, blob: &DocumentBlob) -> Result<(), SaveError> {
    fs::write(path, blob.as_str()).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = blob.as_str().len(), "document written");
    Ok(())
}

/// Read a blob from `path`.
pub fn read_blob(path: &Path) -> Result<DocumentBlob, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| LoadError::Encoding {
        path: path.to_path_buf(),
    })?;
    info!(path = %path.display(), bytes = text.len(), "document read");
    Ok(DocumentBlob::from_string(text))
}
