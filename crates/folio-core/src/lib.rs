#![warn(missing_docs)]
//! Folio Core - Headless Paginated Rich-Text Document Engine
//!
//! # Overview
//!
//! `folio-core` is the engine behind a paginated WYSIWYG document editor. It owns the document
//! model and every formatting, pagination, search and serialization rule, and leaves drawing to a
//! frontend that implements the [`Surface`] trait over its text widget.
//!
//! # Core Features
//!
//! - **Rich-Text Model**: paragraphs of styled text runs and inline images, with merge-only
//!   character and paragraph formats
//! - **Typing Context**: the format the next typed characters receive, kept by the engine rather
//!   than read back from the widget
//! - **Pagination**: a contiguous page map with one active page living in the surface
//! - **Search/Replace**: regex matching over the active page's plain text with a wrapping cursor
//! - **Portable Blob**: all pages in one markup document separated by page-break markers
//! - **State Tracking**: version numbers, a modified flag and change notifications
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Command Interface & State Management       │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Pages / Search / Typing Context            │  ← Engines
//! ├─────────────────────────────────────────────┤
//! │  Surface (+ in-memory RichTextSurface)      │  ← Widget Boundary
//! ├─────────────────────────────────────────────┤
//! │  Markup Codec / Document Blob               │  ← Serialization
//! ├─────────────────────────────────────────────┤
//! │  RichText / CharFormat / BlockFormat        │  ← Document Model
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use folio_core::{Command, CommandExecutor, EditCommand, PageCommand, import};
//!
//! let mut executor = CommandExecutor::empty();
//! executor.execute(Command::Edit(EditCommand::InsertText { text: "First".to_string() })).unwrap();
//! executor.execute(Command::Page(PageCommand::GoTo { page: 2 })).unwrap();
//! executor.execute(Command::Edit(EditCommand::InsertText { text: "Second".to_string() })).unwrap();
//!
//! let blob = executor.export_blob();
//! let pages = import(blob.as_str()).unwrap();
//! assert_eq!(pages.len(), 2);
//! ```
//!
//! # Module Description
//!
//! - [`document`] - Rich-text document model
//! - [`format`] - Character and paragraph formats
//! - [`markup`] - Page markup reader/writer
//! - [`surface`] - Rendering surface abstraction
//! - [`typing`] - Typing context and named styles
//! - [`pages`] - Page store and navigation
//! - [`search`] - Search/replace and the match cursor
//! - [`blob`] - Multi-page document blob and file I/O
//! - [`media`] - Image probing and hyperlinks
//! - [`commands`] - Unified command interface
//! - [`state`] - State management and change notifications
//! - [`config`] - Editor configuration

pub mod blob;
pub mod color;
pub mod commands;
pub mod config;
pub mod document;
mod error;
pub mod format;
pub mod markup;
pub mod media;
pub mod pages;
pub mod search;
pub mod state;
pub mod surface;
pub mod typing;

pub use blob::{
    BLOB_PREFIX, BLOB_SUFFIX, DocumentBlob, ExportFormat, PAGE_BREAK_MARKER, export_html, import,
    read_blob, write_html,
};
pub use color::{ParseColorError, Rgb};
pub use commands::{
    CharAttribute, ColorSwatch, Command, CommandExecutor, CommandResult, EditCommand,
    FormatCommand, IndentDirection, PageCommand, SearchCommand,
};
pub use config::{ConfigError, EditorConfig};
pub use document::{Block, ImageRef, Inline, OBJECT_REPLACEMENT_CHAR, RichText, Span};
pub use error::{DecodeError, FolioError, LoadError, SaveError, ValidationError};
pub use format::{
    BlockFormat, CharFormat, DEFAULT_FONT_FAMILY, DEFAULT_POINT_SIZE, INDENT_WIDTH_PX,
    MAX_INDENT,
};
pub use markup::{MarkupError, from_markup, to_markup};
pub use media::{IMAGE_DIMENSION_RANGE, LinkSpec, clamp_dimension, probe_image};
pub use pages::{PAGE_MARGIN, PageMap, PageStore};
pub use search::{MatchSet, SearchError, SearchMatch, SearchOptions};
pub use state::{
    DocumentState, DocumentStateManager, StateChange, StateChangeCallback, StateChangeType,
};
pub use surface::{Margins, RichTextSurface, Surface, SurfaceChange, TextSelection};
pub use typing::{StyleRecord, ToggleAttribute, TypingContext};
