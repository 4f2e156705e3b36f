//! Command Interface Layer
//!
//! Every user action on an open document goes through [`CommandExecutor::execute`]: formatting,
//! editing, page navigation and search/replace.
//!
//! # Overview
//!
//! The executor owns the rendering [`Surface`], the [`TypingContext`], the [`PageStore`], the
//! [`MatchSet`] of the last search and the color swatch. Commands come in four groups:
//!
//! - **Format**: character attributes, toggles, indentation, line spacing, text color, named styles
//! - **Edit**: typing, inline images, hyperlinks, selection
//! - **Page**: navigation, page count, flush
//! - **Search**: find, next/previous match, replace all
//!
//! # Re-entrancy
//!
//! Mutations the executor performs on its own behalf run with surface signals blocked. Text typed
//! into the surface directly (unblocked) is picked up by
//! [`process_surface_changes`](CommandExecutor::process_surface_changes), which merges the typing
//! context's format over the inserted range, again with signals blocked.
//!
//! # Example
//!
//! ```rust
//! use folio_core::{Command, CommandExecutor, EditCommand, FormatCommand, Surface, ToggleAttribute};
//!
//! let mut executor = CommandExecutor::empty();
//! executor.execute(Command::Format(FormatCommand::Toggle(ToggleAttribute::Bold))).unwrap();
//! executor.execute(Command::Edit(EditCommand::InsertText { text: "Hello".to_string() })).unwrap();
//!
//! assert!(executor.surface().char_format_at(5).is_bold());
//! ```

use crate::blob::DocumentBlob;
use crate::color::Rgb;
use crate::config::EditorConfig;
use crate::document::ImageRef;
use crate::error::FolioError;
use crate::format::{BlockFormat, CharFormat, MAX_INDENT, line_spacing_percent};
use crate::media::LinkSpec;
use crate::pages::{PageMap, PageStore};
use crate::search::{self, MatchSet, SearchOptions};
use crate::surface::{RichTextSurface, Surface, SurfaceChange, TextSelection};
use crate::typing::{StyleRecord, ToggleAttribute, TypingContext};
use std::ops::Range;
use tracing::debug;

/// A character attribute with a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharAttribute {
    /// Font family name.
    FontFamily(String),
    /// Point size.
    PointSize(u32),
    /// Foreground color.
    Color(Rgb),
}

/// Indentation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentDirection {
    /// One level deeper, never beyond [`MAX_INDENT`].
    Increase,
    /// One level shallower, never below zero.
    Decrease,
}

/// What the color swatch shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorSwatch {
    /// No color affordance (the text color is black).
    #[default]
    None,
    /// The current text color.
    Color(Rgb),
}

/// Formatting commands
#[derive(Debug, Clone, PartialEq)]
pub enum FormatCommand {
    /// Merge an attribute into the selection (or the word under the caret).
    SetAttribute(CharAttribute),
    /// Flip bold/italic/underline in the typing context and apply the new value.
    Toggle(ToggleAttribute),
    /// Change the whole-document indent level.
    Indent(IndentDirection),
    /// Set line spacing from user input such as `"1.5"`.
    ///
    /// Input that is not a positive number is ignored.
    SetLineSpacing {
        /// The numeral as typed.
        input: String,
    },
    /// Apply a text color and update the swatch.
    SetTextColor(Rgb),
    /// Adopt a named style into the typing context and apply it.
    ApplyStyle(StyleRecord),
}

/// Editing commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Type `text` at the selection, as a keyboard would.
    InsertText {
        /// Text to insert.
        text: String,
    },
    /// Insert an inline image at the selection.
    InsertImage(ImageRef),
    /// Insert a hyperlink at the selection.
    InsertLink {
        /// Visible text.
        text: String,
        /// Target address.
        href: String,
    },
    /// Move the selection.
    SetSelection {
        /// Fixed end.
        anchor: usize,
        /// Caret position.
        position: usize,
    },
}

/// Pagination commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCommand {
    /// Activate a page (1-based).
    GoTo {
        /// Target page.
        page: u32,
    },
    /// Change the number of pages.
    SetPageCount {
        /// New page count (clamped to at least 1).
        count: u32,
    },
    /// Write the active page back into the page map.
    Flush,
}

/// Search commands (current page only)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCommand {
    /// Search and select the first match.
    Find {
        /// Search pattern.
        query: String,
        /// Case sensitivity / whole-word.
        options: SearchOptions,
    },
    /// Select the next match, wrapping.
    Next,
    /// Select the previous match, wrapping.
    Previous,
    /// Replace every match on the current page (drops the page's formatting).
    ReplaceAll {
        /// Search pattern.
        find: String,
        /// Replacement text.
        replacement: String,
        /// Case sensitivity / whole-word.
        options: SearchOptions,
    },
    /// Forget the current matches.
    Clear,
}

/// Unified command enum
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Formatting commands
    Format(FormatCommand),
    /// Editing commands
    Edit(EditCommand),
    /// Pagination commands
    Page(PageCommand),
    /// Search commands
    Search(SearchCommand),
}

/// Command execution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Success, no return value
    Success,
    /// Inserted character range.
    Inserted(Range<usize>),
    /// The active page after a pagination command.
    Page(u32),
    /// Search result: start offsets of every match.
    Matches(Vec<usize>),
    /// Navigation result: the selected match (half-open).
    SearchMatch {
        /// Inclusive start character offset.
        start: usize,
        /// Exclusive end character offset.
        end: usize,
    },
    /// Navigation result: nothing to navigate.
    SearchNotFound,
    /// Replace result: how many occurrences were replaced.
    Replaced(usize),
    /// The swatch after a color change.
    Swatch(ColorSwatch),
}

/// Command executor
///
/// Owns one open document: its surface, typing context, pages and search state.
pub struct CommandExecutor<S: Surface = RichTextSurface> {
    surface: S,
    typing: TypingContext,
    pages: PageStore,
    matches: MatchSet,
    swatch: ColorSwatch,
}

impl CommandExecutor {
    /// A headless executor over an empty in-memory surface with default settings.
    pub fn empty() -> Self {
        Self::new(RichTextSurface::new(), &EditorConfig::default())
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S: Surface> CommandExecutor<S> {
    /// Wrap `surface`, which becomes page 1 of a one-page document.
    pub fn new(mut surface: S, config: &EditorConfig) -> Self {
        let pages = PageStore::new(config.margins());
        surface.set_page_margins(pages.margins());
        let typing = config.typing_context();
        let swatch = swatch_for(typing.current_color);
        Self {
            surface,
            typing,
            pages,
            matches: MatchSet::default(),
            swatch,
        }
    }

    /// Execute command
    pub fn execute(&mut self, command: Command) -> Result<CommandResult, FolioError> {
        debug!(?command, "executing command");
        let result = match command {
            Command::Format(cmd) => self.execute_format(cmd),
            Command::Edit(cmd) => self.execute_edit(cmd),
            Command::Page(cmd) => self.execute_page(cmd),
            Command::Search(cmd) => self.execute_search(cmd),
        };
        self.process_surface_changes();
        result
    }

    /// Execute multiple commands, stopping at the first failure.
    pub fn execute_batch(
        &mut self,
        commands: Vec<Command>,
    ) -> Result<Vec<CommandResult>, FolioError> {
        commands.into_iter().map(|cmd| self.execute(cmd)).collect()
    }

    /// The rendering surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface, for frontends that route typing straight into it.
    ///
    /// Call [`process_surface_changes`](Self::process_surface_changes) afterwards.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The typing context.
    pub fn typing_context(&self) -> &TypingContext {
        &self.typing
    }

    /// The page store. The active page's entry may lag behind the surface.
    pub fn pages(&self) -> &PageStore {
        &self.pages
    }

    /// Matches of the last search.
    pub fn matches(&self) -> &MatchSet {
        &self.matches
    }

    /// The color swatch.
    pub fn swatch(&self) -> ColorSwatch {
        self.swatch
    }

    /// Drain the surface's queued notifications and reconcile typed text with the typing context.
    ///
    /// Returns the drained notifications.
    pub fn process_surface_changes(&mut self) -> Vec<SurfaceChange> {
        let changes = self.surface.take_changes();
        for change in &changes {
            if let SurfaceChange::TextChanged { range } = change {
                self.reconcile_typed_range(range.clone());
            }
        }
        changes
    }

    /// Flush and return every page.
    pub fn snapshot(&mut self) -> PageMap {
        self.pages.snapshot(&self.surface)
    }

    /// Flush and serialize the whole document.
    pub fn export_blob(&mut self) -> DocumentBlob {
        DocumentBlob::from_pages(&self.snapshot())
    }

    /// Replace the document with `pages`. On error nothing changes.
    pub fn load_pages(&mut self, pages: PageMap) -> Result<(), FolioError> {
        self.guarded(|surface, _, store| store.replace(pages, surface))?;
        self.matches.clear();
        Ok(())
    }

    /// Replace the document with the pages of `blob`. On error nothing changes.
    pub fn load_blob(&mut self, blob: &DocumentBlob) -> Result<(), FolioError> {
        let pages = blob.split_pages()?;
        self.load_pages(pages)
    }

    /// Start over with one empty page.
    pub fn reset(&mut self) -> Result<(), FolioError> {
        let mut pages = PageMap::new();
        pages.insert(1, String::new());
        self.load_pages(pages)
    }

    /// Hyperlink target under the caret.
    pub fn link_at_cursor(&self) -> Option<String> {
        self.surface.href_at(self.surface.selection().position)
    }

    fn execute_format(&mut self, command: FormatCommand) -> Result<CommandResult, FolioError> {
        let result = match command {
            FormatCommand::SetAttribute(attr) => {
                self.apply_character_attribute(attr);
                CommandResult::Success
            }
            FormatCommand::Toggle(attr) => {
                self.toggle(attr);
                CommandResult::Success
            }
            FormatCommand::Indent(direction) => {
                self.set_indent(direction);
                CommandResult::Success
            }
            FormatCommand::SetLineSpacing { input } => {
                self.set_line_spacing(&input);
                CommandResult::Success
            }
            FormatCommand::SetTextColor(color) => CommandResult::Swatch(self.set_text_color(color)),
            FormatCommand::ApplyStyle(style) => {
                style.validate()?;
                self.apply_style(&style);
                CommandResult::Success
            }
        };
        Ok(result)
    }

    fn apply_character_attribute(&mut self, attr: CharAttribute) {
        let format = match attr {
            CharAttribute::PointSize(0) => {
                debug!("ignoring zero point size");
                return;
            }
            CharAttribute::FontFamily(family) => {
                self.typing.current_font_family = family.clone();
                CharFormat::new().with_font_family(family)
            }
            CharAttribute::PointSize(size) => {
                self.typing.current_point_size = size;
                CharFormat::new().with_point_size(size)
            }
            CharAttribute::Color(color) => {
                self.typing.current_color = color;
                CharFormat::new().with_color(color)
            }
        };
        self.merge_on_selection_or_word(&format);
    }

    fn toggle(&mut self, attr: ToggleAttribute) {
        // The flag flips unconditionally; the surface's actual formatting is never read back.
        let on = self.typing.flip(attr);
        let format = match attr {
            ToggleAttribute::Bold => CharFormat::new().with_bold(on),
            ToggleAttribute::Italic => CharFormat::new().with_italic(on),
            ToggleAttribute::Underline => CharFormat::new().with_underline(on),
        };
        self.merge_on_selection_or_word(&format);
    }

    fn set_indent(&mut self, direction: IndentDirection) {
        self.typing.current_indent = match direction {
            IndentDirection::Increase => (self.typing.current_indent + 1).min(MAX_INDENT),
            IndentDirection::Decrease => self.typing.current_indent.saturating_sub(1),
        };
        let format = BlockFormat::new().with_indent(self.typing.current_indent);
        self.guarded(|surface, _, _| {
            let whole = 0..surface.char_count();
            surface.merge_block_format(whole, &format);
        });
    }

    fn set_line_spacing(&mut self, input: &str) {
        let Ok(multiplier) = input.trim().parse::<f32>() else {
            debug!(input = %input, "ignoring non-numeric line spacing");
            return;
        };
        let Some(percent) = line_spacing_percent(multiplier) else {
            debug!(multiplier, "ignoring non-positive line spacing");
            return;
        };
        self.typing.current_line_spacing = multiplier;
        self.merge_on_selected_blocks(&BlockFormat::new().with_line_height_percent(percent));
    }

    fn set_text_color(&mut self, color: Rgb) -> ColorSwatch {
        self.apply_character_attribute(CharAttribute::Color(color));
        self.swatch = swatch_for(color);
        self.swatch
    }

    fn apply_style(&mut self, style: &StyleRecord) {
        self.typing.adopt(style);
        self.merge_on_selection_or_word(&style.char_format());
        if let Some(percent) = line_spacing_percent(style.line_spacing) {
            self.merge_on_selected_blocks(&BlockFormat::new().with_line_height_percent(percent));
        }
        self.swatch = swatch_for(style.color);
    }

    fn execute_edit(&mut self, command: EditCommand) -> Result<CommandResult, FolioError> {
        match command {
            // Typing is deliberately unguarded: the surface reports the insertion and
            // reconciliation applies the typing context, like keystrokes in a widget.
            EditCommand::InsertText { text } => {
                let range = self.surface.insert_text(&text, &CharFormat::default());
                Ok(CommandResult::Inserted(range))
            }
            EditCommand::InsertImage(image) => {
                let range = self.guarded(|surface, _, _| surface.insert_image(image));
                Ok(CommandResult::Inserted(range))
            }
            EditCommand::InsertLink { text, href } => {
                let link = LinkSpec::new(text, href)?;
                let range = self.guarded(|surface, typing, _| {
                    let format = typing.char_format().merged(&link.char_format());
                    surface.insert_text(link.text(), &format)
                });
                Ok(CommandResult::Inserted(range))
            }
            EditCommand::SetSelection { anchor, position } => {
                self.surface
                    .set_selection(TextSelection::new(anchor, position));
                Ok(CommandResult::Success)
            }
        }
    }

    fn execute_page(&mut self, command: PageCommand) -> Result<CommandResult, FolioError> {
        match command {
            PageCommand::GoTo { page } => {
                self.guarded(|surface, _, store| store.navigate(page, surface))?;
                // Match offsets belong to the page that was active.
                self.matches.clear();
            }
            PageCommand::SetPageCount { count } => {
                let before = self.pages.current_page();
                self.guarded(|surface, _, store| store.set_page_count(count, surface))?;
                if self.pages.current_page() != before {
                    self.matches.clear();
                }
            }
            PageCommand::Flush => self.pages.flush_active(&self.surface),
        }
        Ok(CommandResult::Page(self.pages.current_page()))
    }

    fn execute_search(&mut self, command: SearchCommand) -> Result<CommandResult, FolioError> {
        match command {
            SearchCommand::Find { query, options } => {
                let found = search::find_all(&self.surface.plain_text(), &query, options)?;
                self.matches = MatchSet::new(&found, &query);
                debug!(query = %query, matches = self.matches.len(), "search");
                if let Some(start) = self.matches.current_position() {
                    self.select_match(start);
                }
                Ok(CommandResult::Matches(self.matches.positions().to_vec()))
            }
            SearchCommand::Next => Ok(match self.matches.next() {
                Some(start) => self.select_match(start),
                None => CommandResult::SearchNotFound,
            }),
            SearchCommand::Previous => Ok(match self.matches.previous() {
                Some(start) => self.select_match(start),
                None => CommandResult::SearchNotFound,
            }),
            SearchCommand::ReplaceAll {
                find,
                replacement,
                options,
            } => {
                let (text, count) = search::replace_all(
                    &self.surface.plain_text(),
                    &find,
                    &replacement,
                    options,
                )?;
                if count > 0 {
                    self.guarded(|surface, _, store| {
                        surface.set_plain_text(&text);
                        surface.set_page_margins(store.margins());
                    });
                }
                self.matches.clear();
                debug!(find = %find, count, "replace all");
                Ok(CommandResult::Replaced(count))
            }
            SearchCommand::Clear => {
                self.matches.clear();
                Ok(CommandResult::Success)
            }
        }
    }

    fn select_match(&mut self, start: usize) -> CommandResult {
        let span = self.matches.selection_for(start);
        self.guarded(|surface, _, _| {
            surface.set_selection(TextSelection::new(span.start, span.end));
        });
        CommandResult::SearchMatch {
            start: span.start,
            end: span.end,
        }
    }

    /// Selected range, or the word under the caret when nothing is selected.
    fn selection_or_word(&self) -> Option<Range<usize>> {
        let selection = self.surface.selection();
        if selection.is_empty() {
            self.surface.word_range_at(selection.position)
        } else {
            Some(selection.range())
        }
    }

    fn merge_on_selection_or_word(&mut self, format: &CharFormat) {
        let Some(target) = self.selection_or_word() else {
            return;
        };
        self.guarded(|surface, _, _| surface.merge_char_format(target, format));
    }

    fn merge_on_selected_blocks(&mut self, format: &BlockFormat) {
        let range = self.surface.selection().range();
        self.guarded(|surface, _, _| surface.merge_block_format(range, format));
    }

    fn reconcile_typed_range(&mut self, range: Range<usize>) {
        let selection = self.surface.selection();
        if range.is_empty() || !selection.is_empty() || selection.position != range.end {
            return;
        }
        let format = self.typing.char_format();
        self.guarded(|surface, _, _| surface.merge_char_format(range, &format));
    }

    /// Run `f` with surface notifications suppressed.
    fn guarded<R>(
        &mut self,
        f: impl FnOnce(&mut S, &TypingContext, &mut PageStore) -> R,
    ) -> R {
        let was_blocked = self.surface.block_signals(true);
        let out = f(&mut self.surface, &self.typing, &mut self.pages);
        self.surface.block_signals(was_blocked);
        out
    }
}

fn swatch_for(color: Rgb) -> ColorSwatch {
    if color.is_black() {
        ColorSwatch::None
    } else {
        ColorSwatch::Color(color)
    }
}
