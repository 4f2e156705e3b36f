//! Dialog capabilities.
//!
//! Each picker returns `Result<T, Cancelled>`; a frontend implements these traits over its
//! toolkit's modal dialogs, tests implement them with scripted answers.

use folio_core::Rgb;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("dialog cancelled")]
/// The user dismissed a picker without choosing.
pub struct Cancelled;

/// File type filter for file pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFilter {
    /// Human readable description.
    pub description: &'static str,
    /// Accepted extensions, without the dot.
    pub extensions: &'static [&'static str],
}

impl FileFilter {
    /// Portable HTML document blobs.
    pub const HTML: Self = Self {
        description: "HTML documents",
        extensions: &["html", "htm"],
    };

    /// PDF output.
    pub const PDF: Self = Self {
        description: "PDF documents",
        extensions: &["pdf"],
    };

    /// Images accepted for insertion.
    pub const IMAGES: Self = Self {
        description: "Images",
        extensions: &["png", "jpg", "jpeg", "gif", "bmp"],
    };
}

/// Chooses files to open or save.
pub trait FilePicker {
    /// Choose an existing file.
    fn pick_open(&mut self, title: &str, filter: FileFilter) -> Result<PathBuf, Cancelled>;

    /// Choose a destination file.
    fn pick_save(&mut self, title: &str, filter: FileFilter) -> Result<PathBuf, Cancelled>;
}

/// Chooses a color.
pub trait ColorPicker {
    /// Choose a color, starting from `initial`.
    fn pick_color(&mut self, initial: Rgb) -> Result<Rgb, Cancelled>;
}

/// Chooses a bounded integer.
pub trait IntegerPicker {
    /// Choose a value in `range`, starting from `initial`.
    fn pick_integer(
        &mut self,
        label: &str,
        initial: u32,
        range: RangeInclusive<u32>,
    ) -> Result<u32, Cancelled>;
}

/// Asks for a line of text.
pub trait TextPrompt {
    /// Ask for text, pre-filled with `initial`.
    fn prompt_text(&mut self, label: &str, initial: &str) -> Result<String, Cancelled>;
}

/// Answer to a yes/no question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// Proceed.
    Yes,
    /// Do not proceed.
    No,
}

/// Yes/no confirmation.
pub trait Confirm {
    /// Ask `question`; `default` is the focused button.
    fn confirm(&mut self, question: &str, default: Answer) -> Answer;
}

/// How prominent a message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Plain information.
    Info,
    /// Something went wrong; the document is unchanged.
    Error,
}

/// Shows messages to the user.
pub trait MessageSink {
    /// Display `text`.
    fn show_message(&mut self, severity: Severity, text: &str);
}

/// Hands addresses to the external browser.
pub trait LinkOpener {
    /// Open `href`.
    fn open_link(&mut self, href: &str) -> std::io::Result<()>;
}

/// Every capability the editor controller needs.
pub trait Dialogs:
    FilePicker + ColorPicker + IntegerPicker + TextPrompt + Confirm + MessageSink + LinkOpener
{
}

impl<T> Dialogs for T where
    T: FilePicker + ColorPicker + IntegerPicker + TextPrompt + Confirm + MessageSink + LinkOpener
{
}
