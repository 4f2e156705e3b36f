//! Rendering surface abstraction.
//!
//! The engines in this crate never talk to a concrete widget. They depend on [`Surface`]: a
//! narrow interface over "styled text with a cursor" that a frontend implements on top of its
//! text widget. [`RichTextSurface`] is the in-memory implementation used headless and in tests.
//!
//! # Change notifications
//!
//! Widgets emit change notifications; a surface queues them as [`SurfaceChange`] values which the
//! owner drains with [`Surface::take_changes`]. [`Surface::block_signals`] suppresses queuing, so a
//! handler can mutate the surface in response to a change without observing its own mutation.

use crate::document::{ImageRef, RichText};
use crate::format::{BlockFormat, CharFormat};
use crate::markup::{self, MarkupError};
use std::ops::Range;

/// A selection: `anchor` is the fixed end, `position` is where the caret is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextSelection {
    /// Fixed end of the selection.
    pub anchor: usize,
    /// Caret position.
    pub position: usize,
}

impl TextSelection {
    /// A selection from `anchor` to `position`.
    pub fn new(anchor: usize, position: usize) -> Self {
        Self { anchor, position }
    }

    /// A collapsed selection (caret only).
    pub fn caret(position: usize) -> Self {
        Self::new(position, position)
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.anchor == self.position
    }

    /// Selected characters as an ordered range.
    pub fn range(&self) -> Range<usize> {
        self.anchor.min(self.position)..self.anchor.max(self.position)
    }

    fn clamped(self, len: usize) -> Self {
        Self::new(self.anchor.min(len), self.position.min(len))
    }
}

/// Page frame margins in layout units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Margins {
    /// Top margin.
    pub top: f32,
    /// Right margin.
    pub right: f32,
    /// Bottom margin.
    pub bottom: f32,
    /// Left margin.
    pub left: f32,
}

impl Margins {
    /// No margins (what a surface falls back to after its content is replaced).
    pub const ZERO: Self = Self::uniform(0.0);

    /// The same margin on all four sides.
    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// A queued change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceChange {
    /// Characters in `range` were inserted.
    TextChanged {
        /// Inserted character range.
        range: Range<usize>,
    },
    /// Characters or paragraphs in `range` were reformatted.
    FormatChanged {
        /// Reformatted character range.
        range: Range<usize>,
    },
    /// The whole content was replaced.
    ContentReplaced,
    /// The selection moved.
    SelectionChanged,
}

/// A styled-text surface with a selection.
pub trait Surface {
    /// Plain-text projection of the content.
    fn plain_text(&self) -> String;
    /// Replace the content with unformatted text.
    fn set_plain_text(&mut self, text: &str);
    /// Serialized content.
    fn markup(&self) -> String;
    /// Replace the content with parsed markup. On error the content is left unchanged.
    fn set_markup(&mut self, markup: &str) -> Result<(), MarkupError>;
    /// Content length in characters.
    fn char_count(&self) -> usize;

    /// Current selection.
    fn selection(&self) -> TextSelection;
    /// Move the selection (clamped to the content).
    fn set_selection(&mut self, selection: TextSelection);

    /// Merge a character format over `range`.
    fn merge_char_format(&mut self, range: Range<usize>, format: &CharFormat);
    /// Merge a paragraph format over the paragraphs touched by `range`.
    fn merge_block_format(&mut self, range: Range<usize>, format: &BlockFormat);
    /// The surface's native character format at `offset`.
    fn char_format_at(&self, offset: usize) -> CharFormat;
    /// Word under `offset`, if any.
    fn word_range_at(&self, offset: usize) -> Option<Range<usize>>;
    /// Hyperlink target at `offset`, if any.
    fn href_at(&self, offset: usize) -> Option<String>;

    /// Replace the selection with `text` in `format`; the caret ends after it. Returns the
    /// inserted range.
    fn insert_text(&mut self, text: &str, format: &CharFormat) -> Range<usize>;
    /// Replace the selection with an inline image; the caret ends after it.
    fn insert_image(&mut self, image: ImageRef) -> Range<usize>;

    /// Current page frame margins.
    fn page_margins(&self) -> Margins;
    /// Set the page frame margins.
    fn set_page_margins(&mut self, margins: Margins);

    /// Enable or disable change notifications; returns the previous "blocked" state.
    fn block_signals(&mut self, blocked: bool) -> bool;
    /// Drain queued change notifications.
    fn take_changes(&mut self) -> Vec<SurfaceChange>;
}

/// In-memory [`Surface`] backed by a [`RichText`].
#[derive(Debug, Clone, Default)]
pub struct RichTextSurface {
    text: RichText,
    selection: TextSelection,
    margins: Margins,
    signals_blocked: bool,
    pending: Vec<SurfaceChange>,
}

impl RichTextSurface {
    /// An empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface holding unformatted `text`.
    pub fn with_plain_text(text: &str) -> Self {
        Self {
            text: RichText::from_plain_text(text),
            ..Self::default()
        }
    }

    /// Read-only access to the content model.
    pub fn document(&self) -> &RichText {
        &self.text
    }

    fn emit(&mut self, change: SurfaceChange) {
        if !self.signals_blocked {
            self.pending.push(change);
        }
    }

    fn replace_content(&mut self, text: RichText) {
        self.text = text;
        self.selection = TextSelection::default();
        // Replacing the document drops its root frame format, margins included.
        self.margins = Margins::ZERO;
        self.emit(SurfaceChange::ContentReplaced);
    }
}

impl Surface for RichTextSurface {
    fn plain_text(&self) -> String {
        self.text.plain_text()
    }

    fn set_plain_text(&mut self, text: &str) {
        self.replace_content(RichText::from_plain_text(text));
    }

    fn markup(&self) -> String {
        markup::to_markup(&self.text)
    }

    fn set_markup(&mut self, markup: &str) -> Result<(), MarkupError> {
        let text = markup::from_markup(markup)?;
        self.replace_content(text);
        Ok(())
    }

    fn char_count(&self) -> usize {
        self.text.char_count()
    }

    fn selection(&self) -> TextSelection {
        self.selection
    }

    fn set_selection(&mut self, selection: TextSelection) {
        let selection = selection.clamped(self.text.char_count());
        if selection != self.selection {
            self.selection = selection;
            self.emit(SurfaceChange::SelectionChanged);
        }
    }

    fn merge_char_format(&mut self, range: Range<usize>, format: &CharFormat) {
        if range.is_empty() || format.is_empty() {
            return;
        }
        self.text.merge_char_format(range.clone(), format);
        self.emit(SurfaceChange::FormatChanged { range });
    }

    fn merge_block_format(&mut self, range: Range<usize>, format: &BlockFormat) {
        self.text.merge_block_format(range.clone(), format);
        self.emit(SurfaceChange::FormatChanged { range });
    }

    fn char_format_at(&self, offset: usize) -> CharFormat {
        self.text.char_format_at(offset)
    }

    fn word_range_at(&self, offset: usize) -> Option<Range<usize>> {
        self.text.word_range_at(offset)
    }

    fn href_at(&self, offset: usize) -> Option<String> {
        self.text.href_at(offset)
    }

    fn insert_text(&mut self, text: &str, format: &CharFormat) -> Range<usize> {
        let selected = self.selection.range();
        self.text.remove(selected.clone());
        let inserted = self.text.insert_text(selected.start, text, format);
        self.selection = TextSelection::caret(inserted.end);
        self.emit(SurfaceChange::TextChanged {
            range: inserted.clone(),
        });
        inserted
    }

    fn insert_image(&mut self, image: ImageRef) -> Range<usize> {
        let selected = self.selection.range();
        self.text.remove(selected.clone());
        // Images carry no character format of their own in markup.
        let inserted = self
            .text
            .insert_image(selected.start, image, &CharFormat::default());
        self.selection = TextSelection::caret(inserted.end);
        self.emit(SurfaceChange::TextChanged {
            range: inserted.clone(),
        });
        inserted
    }

    fn page_margins(&self) -> Margins {
        self.margins
    }

    fn set_page_margins(&mut self, margins: Margins) {
        self.margins = margins;
    }

    fn block_signals(&mut self, blocked: bool) -> bool {
        std::mem::replace(&mut self.signals_blocked, blocked)
    }

    fn take_changes(&mut self) -> Vec<SurfaceChange> {
        std::mem::take(&mut self.pending)
    }
}
