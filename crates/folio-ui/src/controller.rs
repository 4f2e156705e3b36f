//! The editor controller.
//!
//! Binds a [`DocumentStateManager`] to the dialog capabilities, the style store and the PDF
//! renderer. Every user action runs to completion here: errors are logged and shown through
//! [`MessageSink`](crate::MessageSink), never returned.

use crate::dialogs::{Answer, Cancelled, Dialogs, FileFilter, Severity};
use crate::panels::{ReplacePanel, SearchPanel};
use folio_core::{
    CharAttribute, Command, CommandExecutor, CommandResult, DocumentStateManager, EditCommand,
    EditorConfig, FormatCommand, IMAGE_DIMENSION_RANGE, ImageRef, IndentDirection, PageCommand,
    RichTextSurface, SearchCommand, StyleRecord, Surface, ToggleAttribute, clamp_dimension,
    probe_image, read_blob, write_html,
};
use folio_core_pdf::{PdfOptions, write_pdf};
use folio_core_styles::StyleStore;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const DISCARD_QUESTION: &str = "The document has unsaved changes. Discard them?";

/// Drives one open document on behalf of a frontend.
pub struct EditorController<D: Dialogs, S: Surface = RichTextSurface> {
    state: DocumentStateManager<S>,
    styles: StyleStore,
    pdf: PdfOptions,
    dialogs: D,
    document_path: Option<PathBuf>,
    search: SearchPanel,
    replace: ReplacePanel,
}

impl<D: Dialogs> EditorController<D> {
    /// A controller over an empty in-memory document configured by `config`.
    pub fn from_config(config: &EditorConfig, dialogs: D) -> Self {
        let executor = CommandExecutor::new(RichTextSurface::new(), config);
        Self::new(
            DocumentStateManager::new(executor),
            StyleStore::from_config(config),
            PdfOptions::from_config(config),
            dialogs,
        )
    }
}

impl<D: Dialogs, S: Surface> EditorController<D, S> {
    /// Assemble a controller from its parts.
    pub fn new(
        state: DocumentStateManager<S>,
        styles: StyleStore,
        pdf: PdfOptions,
        dialogs: D,
    ) -> Self {
        Self {
            state,
            styles,
            pdf,
            dialogs,
            document_path: None,
            search: SearchPanel::default(),
            replace: ReplacePanel::default(),
        }
    }

    /// The document state.
    pub fn state(&self) -> &DocumentStateManager<S> {
        &self.state
    }

    /// Mutable document state, for subscriptions and widget event processing.
    pub fn state_mut(&mut self) -> &mut DocumentStateManager<S> {
        &mut self.state
    }

    /// The dialog capabilities.
    pub fn dialogs(&self) -> &D {
        &self.dialogs
    }

    /// Mutable dialog capabilities.
    pub fn dialogs_mut(&mut self) -> &mut D {
        &mut self.dialogs
    }

    /// File the document was last opened from or saved to.
    pub fn document_path(&self) -> Option<&Path> {
        self.document_path.as_deref()
    }

    /// Run a command, reporting any failure.
    pub fn run(&mut self, command: Command) -> Option<CommandResult> {
        let result = self.state.execute(command);
        self.report(result)
    }

    fn report<T, E: Display>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                let text = err.to_string();
                warn!(error = %text, "action failed");
                self.dialogs.show_message(Severity::Error, &text);
                None
            }
        }
    }

    fn cancelled<T>(result: Result<T, Cancelled>) -> Option<T> {
        if result.is_err() {
            debug!("dialog cancelled");
        }
        result.ok()
    }

    // -- Formatting -----------------------------------------------------------------------

    /// Apply a font family to the selection or the word under the caret.
    pub fn set_font_family(&mut self, family: &str) {
        self.run(Command::Format(FormatCommand::SetAttribute(
            CharAttribute::FontFamily(family.to_string()),
        )));
    }

    /// Apply a point size to the selection or the word under the caret.
    pub fn set_point_size(&mut self, size: u32) {
        self.run(Command::Format(FormatCommand::SetAttribute(
            CharAttribute::PointSize(size),
        )));
    }

    /// Flip bold, italic or underline.
    pub fn toggle(&mut self, attr: ToggleAttribute) {
        self.run(Command::Format(FormatCommand::Toggle(attr)));
    }

    /// Change the document indentation by one level.
    pub fn indent(&mut self, direction: IndentDirection) {
        self.run(Command::Format(FormatCommand::Indent(direction)));
    }

    /// Ask for a line spacing multiplier. Input that is not a positive number is ignored.
    pub fn prompt_line_spacing(&mut self) {
        let initial = self
            .state
            .executor()
            .typing_context()
            .current_line_spacing
            .to_string();
        let Some(input) = Self::cancelled(self.dialogs.prompt_text("Line spacing", &initial))
        else {
            return;
        };
        self.run(Command::Format(FormatCommand::SetLineSpacing { input }));
    }

    /// Pick a text color and apply it. Returns `false` when cancelled.
    pub fn pick_text_color(&mut self) -> bool {
        let initial = self.state.executor().typing_context().current_color;
        let Some(color) = Self::cancelled(self.dialogs.pick_color(initial)) else {
            return false;
        };
        self.run(Command::Format(FormatCommand::SetTextColor(color)))
            .is_some()
    }

    // -- Images and links -----------------------------------------------------------------

    /// Pick an image, confirm its display size and insert it at the caret.
    ///
    /// The proposed size is the image's native size; each dimension is bounded to
    /// [`IMAGE_DIMENSION_RANGE`].
    pub fn insert_image(&mut self) -> bool {
        let Some(path) = Self::cancelled(self.dialogs.pick_open("Insert image", FileFilter::IMAGES))
        else {
            return false;
        };
        let Some((native_width, native_height)) = self.report(probe_image(&path)) else {
            return false;
        };
        let Some(width) = Self::cancelled(self.dialogs.pick_integer(
            "Width",
            clamp_dimension(native_width),
            IMAGE_DIMENSION_RANGE,
        )) else {
            return false;
        };
        let Some(height) = Self::cancelled(self.dialogs.pick_integer(
            "Height",
            clamp_dimension(native_height),
            IMAGE_DIMENSION_RANGE,
        )) else {
            return false;
        };
        let image = ImageRef::new(
            path.display().to_string(),
            clamp_dimension(width),
            clamp_dimension(height),
        );
        self.run(Command::Edit(EditCommand::InsertImage(image)))
            .is_some()
    }

    /// Ask for link text and address and insert the anchor.
    pub fn insert_link(&mut self) -> bool {
        let Some(text) = Self::cancelled(self.dialogs.prompt_text("Link text", "")) else {
            return false;
        };
        let Some(href) = Self::cancelled(self.dialogs.prompt_text("Address", "")) else {
            return false;
        };
        self.run(Command::Edit(EditCommand::InsertLink { text, href }))
            .is_some()
    }

    /// Open the link under the caret after confirmation. Returns `true` if the browser was asked
    /// to open it.
    pub fn open_link_at_cursor(&mut self) -> bool {
        let Some(href) = self.state.executor().link_at_cursor() else {
            return false;
        };
        let question = format!("Open {href} in the browser?");
        if self.dialogs.confirm(&question, Answer::No) != Answer::Yes {
            return false;
        }
        let opened = self.dialogs.open_link(&href);
        self.report(opened).is_some()
    }

    // -- Styles ---------------------------------------------------------------------------

    /// Names of the stored styles.
    pub fn style_names(&mut self) -> Vec<String> {
        let names = self.styles.list_names();
        self.report(names).unwrap_or_default()
    }

    /// Ask for a name and store the current typing context under it.
    pub fn save_style(&mut self) -> bool {
        let Some(name) = Self::cancelled(self.dialogs.prompt_text("Style name", "")) else {
            return false;
        };
        let record = StyleRecord::from_context(name, self.state.executor().typing_context());
        let saved = self.styles.save(&record);
        self.report(saved).is_some()
    }

    /// Apply the stored style `name`.
    pub fn apply_style(&mut self, name: &str) -> bool {
        let fetched = self.styles.fetch(name);
        let Some(fetched) = self.report(fetched) else {
            return false;
        };
        let Some(record) = fetched else {
            self.dialogs
                .show_message(Severity::Error, &format!("No style named '{name}'"));
            return false;
        };
        self.run(Command::Format(FormatCommand::ApplyStyle(record)))
            .is_some()
    }

    // -- Pages ----------------------------------------------------------------------------

    /// Show page `page`.
    pub fn go_to_page(&mut self, page: u32) {
        self.run(Command::Page(PageCommand::GoTo { page }));
    }

    /// Page stepper value changed.
    pub fn set_page_count(&mut self, count: u32) {
        self.run(Command::Page(PageCommand::SetPageCount { count }));
    }

    // -- Files ----------------------------------------------------------------------------

    /// Save the document as an HTML blob chosen by the user.
    pub fn export_html(&mut self) -> bool {
        let Some(path) = Self::cancelled(self.dialogs.pick_save("Save as HTML", FileFilter::HTML))
        else {
            return false;
        };
        let blob = self.state.export_blob();
        let written = write_html(&path, &blob);
        if self.report(written).is_none() {
            return false;
        }
        self.state.mark_saved();
        self.document_path = Some(path);
        true
    }

    /// Render the document to a PDF file chosen by the user.
    pub fn export_pdf(&mut self) -> bool {
        let Some(path) = Self::cancelled(self.dialogs.pick_save("Export PDF", FileFilter::PDF))
        else {
            return false;
        };
        let pages = self.state.snapshot();
        let mut options = self.pdf.clone();
        if options.title.is_none() {
            options.title = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }
        let written = write_pdf(&path, &pages, &options);
        self.report(written).is_some()
    }

    /// Replace the document with an HTML blob chosen by the user.
    ///
    /// Asks before discarding unsaved changes. A file that cannot be read or parsed leaves the
    /// current document untouched.
    pub fn open_document(&mut self) -> bool {
        if !self.confirm_discard() {
            return false;
        }
        let Some(path) = Self::cancelled(self.dialogs.pick_open("Open document", FileFilter::HTML))
        else {
            return false;
        };
        let blob = read_blob(&path);
        let Some(blob) = self.report(blob) else {
            return false;
        };
        let loaded = self.state.load_blob(&blob);
        if self.report(loaded).is_none() {
            return false;
        }
        info!(path = %path.display(), "document opened");
        self.search.close();
        self.replace.close();
        self.document_path = Some(path);
        true
    }

    /// Start a new, empty document. Asks before discarding unsaved changes.
    pub fn new_document(&mut self) -> bool {
        if !self.confirm_discard() {
            return false;
        }
        let reset = self.state.reset();
        if self.report(reset).is_none() {
            return false;
        }
        self.document_path = None;
        true
    }

    /// Whether the window may close. Asks before discarding unsaved changes.
    pub fn request_close(&mut self) -> bool {
        self.confirm_discard()
    }

    fn confirm_discard(&mut self) -> bool {
        !self.state.is_modified()
            || self.dialogs.confirm(DISCARD_QUESTION, Answer::No) == Answer::Yes
    }

    // -- Search and replace ---------------------------------------------------------------

    /// The find panel.
    pub fn search_panel(&self) -> &SearchPanel {
        &self.search
    }

    /// Mutable find panel inputs.
    pub fn search_panel_mut(&mut self) -> &mut SearchPanel {
        &mut self.search
    }

    /// The replace panel.
    pub fn replace_panel(&self) -> &ReplacePanel {
        &self.replace
    }

    /// Mutable replace panel inputs.
    pub fn replace_panel_mut(&mut self) -> &mut ReplacePanel {
        &mut self.replace
    }

    /// Show the find panel with empty inputs.
    pub fn open_search_panel(&mut self) {
        self.search.show();
    }

    /// Hide the find panel; its inputs and the current matches are forgotten.
    pub fn close_search_panel(&mut self) {
        self.search.close();
        self.run(Command::Search(SearchCommand::Clear));
    }

    /// Show the replace panel with empty inputs.
    pub fn open_replace_panel(&mut self) {
        self.replace.show();
    }

    /// Hide the replace panel and forget its inputs.
    pub fn close_replace_panel(&mut self) {
        self.replace.close();
    }

    /// Search the current page for the find panel's query. Returns the match count.
    pub fn find(&mut self) -> usize {
        let command = self.search.find_command();
        match self.run(Command::Search(command)) {
            Some(CommandResult::Matches(positions)) if positions.is_empty() => {
                self.dialogs.show_message(Severity::Info, "No matches found");
                0
            }
            Some(CommandResult::Matches(positions)) => positions.len(),
            _ => 0,
        }
    }

    /// Select the next match, wrapping.
    pub fn find_next(&mut self) -> Option<(usize, usize)> {
        self.step(SearchCommand::Next)
    }

    /// Select the previous match, wrapping.
    pub fn find_previous(&mut self) -> Option<(usize, usize)> {
        self.step(SearchCommand::Previous)
    }

    fn step(&mut self, command: SearchCommand) -> Option<(usize, usize)> {
        match self.run(Command::Search(command))? {
            CommandResult::SearchMatch { start, end } => Some((start, end)),
            _ => None,
        }
    }

    /// Replace every match of the replace panel's text on the current page.
    pub fn replace_all(&mut self) -> usize {
        let command = self.replace.replace_command();
        let Some(CommandResult::Replaced(count)) = self.run(Command::Search(command)) else {
            return 0;
        };
        let text = match count {
            0 => "No matches found".to_string(),
            1 => "Replaced 1 occurrence".to_string(),
            n => format!("Replaced {n} occurrences"),
        };
        self.dialogs.show_message(Severity::Info, &text);
        count
    }
}
