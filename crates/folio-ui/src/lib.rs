#![warn(missing_docs)]
//! Folio UI - Presentation layer glue for folio-core
//!
//! # Overview
//!
//! A frontend supplies its modal dialogs as capability traits ([`FilePicker`], [`ColorPicker`],
//! [`IntegerPicker`], [`TextPrompt`], [`Confirm`], [`MessageSink`], [`LinkOpener`]) and drives an
//! [`EditorController`]. The controller executes engine commands, talks to the style store and
//! the PDF renderer, guards unsaved changes, and turns every error into a user-visible message.
//!
//! ```text
//! toolbar / menus ─▶ EditorController ─▶ DocumentStateManager ─▶ Surface
//!                         │     │
//!                         │     └──────▶ StyleStore / PDF renderer
//!                         └──────────▶ Dialogs (pickers, prompts, messages)
//! ```

pub mod controller;
pub mod dialogs;
pub mod panels;

pub use controller::EditorController;
pub use dialogs::{
    Answer, Cancelled, ColorPicker, Confirm, Dialogs, FileFilter, FilePicker, IntegerPicker,
    LinkOpener, MessageSink, Severity, TextPrompt,
};
pub use panels::{ReplacePanel, SearchPanel};
