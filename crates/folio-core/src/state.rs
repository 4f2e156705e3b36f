//! Document State Interface
//!
//! Wraps a [`CommandExecutor`] with version tracking, a modified flag and change notifications,
//! so a frontend can redraw incrementally and guard unsaved changes.
//!
//! # Example
//!
//! ```rust
//! use folio_core::{Command, DocumentStateManager, EditCommand, StateChangeType};
//! use std::sync::{Arc, Mutex};
//!
//! let mut manager = DocumentStateManager::empty();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! manager.subscribe(move |change| sink.lock().unwrap().push(change.change_type));
//!
//! manager
//!     .execute(Command::Edit(EditCommand::InsertText { text: "Hi".to_string() }))
//!     .unwrap();
//!
//! assert!(manager.is_modified());
//! assert_eq!(*seen.lock().unwrap(), vec![StateChangeType::DocumentModified]);
//! ```

use crate::blob::DocumentBlob;
use crate::commands::{
    CharAttribute, ColorSwatch, Command, CommandExecutor, CommandResult, EditCommand,
    FormatCommand, PageCommand, SearchCommand,
};
use crate::error::FolioError;
use crate::format::line_spacing_percent;
use crate::pages::PageMap;
use crate::surface::{RichTextSurface, Surface, SurfaceChange};

/// Document state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentState {
    /// Number of pages
    pub page_count: u32,
    /// Active page
    pub current_page: u32,
    /// Character count of the active page
    pub char_count: usize,
    /// Whether the document has unsaved changes
    pub is_modified: bool,
    /// Document version number (incremented after each change)
    pub version: u64,
}

/// State change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChangeType {
    /// Document content modified
    DocumentModified,
    /// Character or paragraph formatting changed
    FormatChanged,
    /// Selection changed
    SelectionChanged,
    /// Active page or page count changed
    PageChanged,
    /// Search matches or the current match changed
    SearchChanged,
    /// Color swatch changed
    SwatchChanged,
}

impl StateChangeType {
    fn modifies_document(self) -> bool {
        matches!(
            self,
            StateChangeType::DocumentModified | StateChangeType::FormatChanged
        )
    }
}

/// State change record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    /// Change type
    pub change_type: StateChangeType,
    /// Old version number
    pub old_version: u64,
    /// New version number
    pub new_version: u64,
}

impl StateChange {
    /// Create a new state change record.
    pub fn new(change_type: StateChangeType, old_version: u64, new_version: u64) -> Self {
        Self {
            change_type,
            old_version,
            new_version,
        }
    }
}

/// State change callback function type
pub type StateChangeCallback = Box<dyn FnMut(&StateChange) + Send>;

/// Document state manager
///
/// Frontends execute commands through [`execute()`](DocumentStateManager::execute). Frontends
/// that let the widget handle keystrokes call
/// [`process_surface_events()`](DocumentStateManager::process_surface_events) after each batch of
/// widget notifications instead.
pub struct DocumentStateManager<S: Surface = RichTextSurface> {
    executor: CommandExecutor<S>,
    state_version: u64,
    is_modified: bool,
    callbacks: Vec<StateChangeCallback>,
}

impl DocumentStateManager {
    /// A manager over a headless, empty document.
    pub fn empty() -> Self {
        Self::new(CommandExecutor::empty())
    }
}

impl<S: Surface> DocumentStateManager<S> {
    /// Wrap an executor. The document starts unmodified.
    pub fn new(executor: CommandExecutor<S>) -> Self {
        Self {
            executor,
            state_version: 0,
            is_modified: false,
            callbacks: Vec::new(),
        }
    }

    /// The command executor.
    pub fn executor(&self) -> &CommandExecutor<S> {
        &self.executor
    }

    /// Mutable access to the executor. Changes made through it are not tracked.
    pub fn executor_mut(&mut self) -> &mut CommandExecutor<S> {
        &mut self.executor
    }

    /// Execute a command, then bump the version and notify subscribers if something changed.
    ///
    /// Widget notifications still queued from before the command are reported first.
    pub fn execute(&mut self, command: Command) -> Result<CommandResult, FolioError> {
        self.process_surface_events();
        let change_type = Self::change_type_for_command(&command);
        let page_before = (
            self.executor.pages().current_page(),
            self.executor.pages().page_count(),
        );
        let swatch_before = self.executor.swatch();

        let result = self.executor.execute(command)?;

        let changed = match (change_type, &result) {
            (_, CommandResult::Replaced(0)) => None,
            (Some(StateChangeType::PageChanged), _) => {
                let page_after = (
                    self.executor.pages().current_page(),
                    self.executor.pages().page_count(),
                );
                (page_after != page_before).then_some(StateChangeType::PageChanged)
            }
            (change_type, _) => change_type,
        };
        if let Some(change_type) = changed {
            self.mark_modified(change_type);
        }
        if self.executor.swatch() != swatch_before {
            self.mark_modified(StateChangeType::SwatchChanged);
        }
        Ok(result)
    }

    fn change_type_for_command(command: &Command) -> Option<StateChangeType> {
        match command {
            Command::Format(FormatCommand::SetLineSpacing { input }) => input
                .trim()
                .parse::<f32>()
                .ok()
                .and_then(line_spacing_percent)
                .map(|_| StateChangeType::FormatChanged),
            Command::Format(FormatCommand::SetAttribute(CharAttribute::PointSize(0))) => None,
            Command::Format(_) => Some(StateChangeType::FormatChanged),
            Command::Edit(EditCommand::InsertText { text }) if text.is_empty() => None,
            Command::Edit(EditCommand::SetSelection { .. }) => {
                Some(StateChangeType::SelectionChanged)
            }
            Command::Edit(_) => Some(StateChangeType::DocumentModified),
            Command::Page(PageCommand::GoTo { .. } | PageCommand::SetPageCount { .. }) => {
                Some(StateChangeType::PageChanged)
            }
            Command::Page(PageCommand::Flush) => None,
            Command::Search(SearchCommand::ReplaceAll { .. }) => {
                Some(StateChangeType::DocumentModified)
            }
            Command::Search(_) => Some(StateChangeType::SearchChanged),
        }
    }

    /// Drain widget notifications (typing, clicks) and report them to subscribers.
    pub fn process_surface_events(&mut self) {
        let changes = self.executor.process_surface_changes();
        let mut modified = false;
        let mut reformatted = false;
        let mut selection = false;
        for change in &changes {
            match change {
                SurfaceChange::TextChanged { .. } | SurfaceChange::ContentReplaced => {
                    modified = true
                }
                SurfaceChange::FormatChanged { .. } => reformatted = true,
                SurfaceChange::SelectionChanged => selection = true,
            }
        }
        if modified {
            self.mark_modified(StateChangeType::DocumentModified);
        } else if reformatted {
            self.mark_modified(StateChangeType::FormatChanged);
        }
        if selection {
            self.mark_modified(StateChangeType::SelectionChanged);
        }
    }

    /// Get current version number
    pub fn version(&self) -> u64 {
        self.state_version
    }

    /// Whether the document has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    /// Check if state has changed since a version
    pub fn has_changed_since(&self, version: u64) -> bool {
        self.state_version > version
    }

    /// Document state snapshot
    pub fn get_document_state(&self) -> DocumentState {
        DocumentState {
            page_count: self.executor.pages().page_count(),
            current_page: self.executor.pages().current_page(),
            char_count: self.executor.surface().char_count(),
            is_modified: self.is_modified,
            version: self.state_version,
        }
    }

    /// The color swatch.
    pub fn swatch(&self) -> ColorSwatch {
        self.executor.swatch()
    }

    /// Subscribe to state change notifications
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&StateChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Increment the version and notify subscribers.
    pub fn mark_modified(&mut self, change_type: StateChangeType) {
        let old_version = self.state_version;
        self.state_version += 1;
        if change_type.modifies_document() {
            self.is_modified = true;
        }
        let change = StateChange::new(change_type, old_version, self.state_version);
        for callback in &mut self.callbacks {
            callback(&change);
        }
    }

    /// Mark document as unmodified (e.g., after saving)
    pub fn mark_saved(&mut self) {
        self.is_modified = false;
    }

    /// Flush and serialize the whole document.
    pub fn export_blob(&mut self) -> DocumentBlob {
        self.executor.export_blob()
    }

    /// Flush and return every page.
    pub fn snapshot(&mut self) -> PageMap {
        self.executor.snapshot()
    }

    /// Replace the document with a loaded blob. The result is unmodified.
    ///
    /// On error the current document, its version and its modified flag are untouched.
    pub fn load_blob(&mut self, blob: &DocumentBlob) -> Result<(), FolioError> {
        self.executor.load_blob(blob)?;
        self.mark_modified(StateChangeType::PageChanged);
        self.is_modified = false;
        Ok(())
    }

    /// Discard the document and start over with one empty page.
    pub fn reset(&mut self) -> Result<(), FolioError> {
        self.executor.reset()?;
        self.mark_modified(StateChangeType::PageChanged);
        self.is_modified = false;
        Ok(())
    }
}
