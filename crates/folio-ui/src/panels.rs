//! Find and replace panel state.
//!
//! Panels keep their inputs only while open; closing resets every field.

use folio_core::{SearchCommand, SearchOptions};

/// The find panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPanel {
    /// Whether the panel is shown.
    pub open: bool,
    /// Search text.
    pub query: String,
    /// Match case.
    pub case_sensitive: bool,
    /// Whole words only.
    pub whole_word: bool,
}

impl SearchPanel {
    /// Show the panel with empty inputs.
    pub fn show(&mut self) {
        *self = Self {
            open: true,
            ..Self::default()
        };
    }

    /// Hide the panel and forget its inputs.
    pub fn close(&mut self) {
        *self = Self::default();
    }

    /// Checkbox state as search options.
    pub fn options(&self) -> SearchOptions {
        SearchOptions::new(self.case_sensitive, self.whole_word)
    }

    /// The command that runs this panel's search.
    pub fn find_command(&self) -> SearchCommand {
        SearchCommand::Find {
            query: self.query.clone(),
            options: self.options(),
        }
    }
}

/// The replace panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacePanel {
    /// Whether the panel is shown.
    pub open: bool,
    /// Text to find.
    pub find: String,
    /// Replacement text.
    pub replacement: String,
    /// Match case.
    pub case_sensitive: bool,
    /// Whole words only.
    pub whole_word: bool,
}

impl ReplacePanel {
    /// Show the panel with empty inputs.
    pub fn show(&mut self) {
        *self = Self {
            open: true,
            ..Self::default()
        };
    }

    /// Hide the panel and forget its inputs.
    pub fn close(&mut self) {
        *self = Self::default();
    }

    /// The command that replaces every match on the current page.
    pub fn replace_command(&self) -> SearchCommand {
        SearchCommand::ReplaceAll {
            find: self.find.clone(),
            replacement: self.replacement.clone(),
            options: SearchOptions::new(self.case_sensitive, self.whole_word),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_resets_inputs() {
        let mut panel = SearchPanel::default();
        panel.show();
        panel.query = "cat".to_string();
        panel.whole_word = true;
        panel.close();
        panel.show();
        assert_eq!(
            panel,
            SearchPanel {
                open: true,
                ..SearchPanel::default()
            }
        );
    }

    #[test]
    fn test_replace_command_carries_checkboxes() {
        let panel = ReplacePanel {
            open: true,
            find: "a".to_string(),
            replacement: "b".to_string(),
            case_sensitive: true,
            whole_word: false,
        };
        assert_eq!(
            panel.replace_command(),
            SearchCommand::ReplaceAll {
                find: "a".to_string(),
                replacement: "b".to_string(),
                options: SearchOptions::new(true, false),
            }
        );
    }
}
