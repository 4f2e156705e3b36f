use folio_core::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced by the style table.
pub enum StoreError {
    #[error(transparent)]
    /// The record cannot be stored (empty name).
    Validation(#[from] ValidationError),

    #[error("cannot access style table '{}': {source}", path.display())]
    /// Filesystem I/O failed.
    Io {
        /// Table file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    #[error("style table '{}' is not valid JSON: {source}", path.display())]
    /// The table file could not be parsed or written as JSON.
    Json {
        /// Table file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected style table columns: {0:?}")]
    /// The file holds a table with a different column list.
    Schema(Vec<String>),

    #[error("invalid value '{value}' in column '{column}'")]
    /// A stored cell does not decode to its column's type.
    Corrupt {
        /// Column name.
        column: &'static str,
        /// Stored text.
        value: String,
    },
}
