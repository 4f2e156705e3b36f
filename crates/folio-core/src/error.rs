use crate::markup::MarkupError;
use crate::search::SearchError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
/// A user-supplied value was empty or out of range.
pub enum ValidationError {
    #[error("style name must not be empty")]
    /// Saving a style without a name.
    EmptyStyleName,

    #[error("search text must not be empty")]
    /// Find or replace-all with an empty search string.
    EmptyQuery,

    #[error("link text must not be empty")]
    /// Inserting a hyperlink without visible text.
    EmptyLinkText,

    #[error("link address must not be empty")]
    /// Inserting a hyperlink without an address.
    EmptyLinkUrl,

    #[error("point size must be greater than zero")]
    /// A style or attribute with a zero point size.
    ZeroPointSize,

    #[error("line spacing must be a positive number, got {0}")]
    /// A style whose line spacing is zero, negative or not finite.
    InvalidLineSpacing(f32),
}

#[derive(Debug, Error)]
/// A document could not be read or parsed.
pub enum LoadError {
    #[error("cannot read '{}': {source}", path.display())]
    /// Filesystem read failed.
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' is not valid UTF-8 text", path.display())]
    /// File content is not text.
    Encoding {
        /// File being read.
        path: PathBuf,
    },

    #[error("page {page} is malformed: {source}")]
    /// Page markup failed to parse.
    Markup {
        /// 1-based page index.
        page: u32,
        /// Parser error.
        #[source]
        source: MarkupError,
    },
}

#[derive(Debug, Error)]
/// A document could not be written.
pub enum SaveError {
    #[error("cannot write '{}': {source}", path.display())]
    /// Destination is not writable.
    Io {
        /// Destination file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode document: {0}")]
    /// The document could not be rendered into the target format.
    Encoding(String),
}

#[derive(Debug, Error)]
#[error("cannot decode image '{}': {source}", path.display())]
/// A file is not a decodable image.
pub struct DecodeError {
    /// Image file.
    pub path: PathBuf,
    /// Decoder error.
    #[source]
    pub source: image::ImageError,
}

#[derive(Debug, Error)]
/// Errors produced by document commands.
pub enum FolioError {
    #[error(transparent)]
    /// Empty required field.
    Validation(#[from] ValidationError),

    #[error(transparent)]
    /// Reading a document failed.
    Load(#[from] LoadError),

    #[error(transparent)]
    /// Writing a document failed.
    Save(#[from] SaveError),

    #[error(transparent)]
    /// An image could not be decoded.
    Decode(#[from] DecodeError),

    #[error(transparent)]
    /// Search pattern errors.
    Search(#[from] SearchError),

    #[error(transparent)]
    /// Markup handed to the surface failed to parse.
    Markup(#[from] MarkupError),

    #[error("invalid page number {0} (pages start at 1)")]
    /// Navigation to page 0.
    InvalidPage(u32),
}

impl FolioError {
    /// The validation failure behind this error, if any.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            FolioError::Validation(err) => Some(err),
            FolioError::Search(SearchError::Validation(err)) => Some(err),
            _ => None,
        }
    }
}
