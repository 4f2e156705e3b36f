use folio_core::{LoadError, MarkupError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while rendering a document to PDF.
pub enum PdfError {
    #[error("page {page} cannot be laid out: {source}")]
    /// A page's markup failed to parse.
    Markup {
        /// 1-based page index.
        page: u32,
        /// Parse failure.
        #[source]
        source: MarkupError,
    },

    #[error(transparent)]
    /// The document blob could not be split into pages.
    Load(#[from] LoadError),

    #[error("cannot write '{}': {source}", path.display())]
    /// The output file could not be written.
    Io {
        /// Output file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}
