//! Search and replace over a page's plain-text projection.
//!
//! All public inputs/outputs are **character offsets** (not byte offsets). The query is used as a
//! regular expression as typed; `whole_word` wraps it in word-boundary anchors and matching is
//! case-insensitive unless `case_sensitive` is set.
//!
//! [`MatchSet`] is the stateful cursor over the matches of the last search.

use crate::error::ValidationError;
use regex::{Regex, RegexBuilder};
use std::ops::Range;

/// Options that control how the pattern is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// If `true`, performs a case-sensitive search.
    pub case_sensitive: bool,
    /// If `true`, the query must match a whole word.
    pub whole_word: bool,
}

impl SearchOptions {
    /// Build options from the two checkboxes of the search panel.
    pub fn new(case_sensitive: bool, whole_word: bool) -> Self {
        Self {
            case_sensitive,
            whole_word,
        }
    }
}

/// A match, expressed as a half-open character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
}

impl SearchMatch {
    /// Returns the length of the match in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the match is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Search errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    /// The query was empty where one is required.
    Validation(#[from] ValidationError),

    #[error("invalid search pattern: {0}")]
    /// The query failed to compile as a pattern.
    InvalidPattern(#[from] regex::Error),
}

#[derive(Debug)]
pub(crate) struct CharIndex {
    char_to_byte: Vec<usize>,
    text_len: usize,
}

impl CharIndex {
    pub(crate) fn new(text: &str) -> Self {
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self {
            char_to_byte,
            text_len: text.len(),
        }
    }

    pub(crate) fn byte_to_char(&self, byte_offset: usize) -> usize {
        let clamped = byte_offset.min(self.text_len);
        match self.char_to_byte.binary_search(&clamped) {
            Ok(idx) => idx,
            Err(idx) => idx,
        }
    }
}

fn compile_search_regex(query: &str, options: SearchOptions) -> Result<Regex, SearchError> {
    let pattern = if options.whole_word {
        format!(r"\b(?:{})\b", query)
    } else {
        query.to_string()
    };

    RegexBuilder::new(&pattern)
        .case_insensitive(!options.case_sensitive)
        .multi_line(true)
        .build()
        .map_err(SearchError::InvalidPattern)
}

/// Find all occurrences of `query` in `text`, in document order.
///
/// - Fails with [`ValidationError::EmptyQuery`] if `query` is empty.
/// - Empty matches are skipped.
pub fn find_all(
    text: &str,
    query: &str,
    options: SearchOptions,
) -> Result<Vec<SearchMatch>, SearchError> {
    if query.is_empty() {
        return Err(ValidationError::EmptyQuery.into());
    }

    let re = compile_search_regex(query, options)?;
    let index = CharIndex::new(text);

    let mut matches: Vec<SearchMatch> = Vec::new();
    for m in re.find_iter(text) {
        let candidate = SearchMatch {
            start: index.byte_to_char(m.start()),
            end: index.byte_to_char(m.end()),
        };
        if candidate.is_empty() {
            continue;
        }
        matches.push(candidate);
    }

    Ok(matches)
}

/// Replace every occurrence of `find` in `text` with `replacement`.
///
/// `$1` / `${name}` in `replacement` expand to capture groups. Returns the rewritten text and the
/// number of replacements. Fails with [`ValidationError::EmptyQuery`] if `find` is empty.
pub fn replace_all(
    text: &str,
    find: &str,
    replacement: &str,
    options: SearchOptions,
) -> Result<(String, usize), SearchError> {
    if find.is_empty() {
        return Err(ValidationError::EmptyQuery.into());
    }

    let re = compile_search_regex(find, options)?;
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;
    for caps in re.captures_iter(text) {
        let Some(m) = caps.get(0) else {
            continue;
        };
        if m.as_str().is_empty() {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        caps.expand(replacement, &mut out);
        last = m.end();
        count += 1;
    }
    out.push_str(&text[last..]);
    Ok((out, count))
}

/// Ordered match positions plus a wrapping cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    positions: Vec<usize>,
    current: Option<usize>,
    query_len: usize,
}

impl MatchSet {
    /// Build a set from search results. The cursor starts on the first match, or is unset when
    /// there is none.
    pub fn new(matches: &[SearchMatch], query: &str) -> Self {
        let positions: Vec<usize> = matches.iter().map(|m| m.start).collect();
        let current = if positions.is_empty() { None } else { Some(0) };
        Self {
            positions,
            current,
            query_len: query.chars().count(),
        }
    }

    /// Match start offsets in document order.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Number of matches.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if there are no matches.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Cursor index, `None` if empty or unset.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Start offset under the cursor.
    pub fn current_position(&self) -> Option<usize> {
        self.current.map(|i| self.positions[i])
    }

    /// Advance the cursor, wrapping to the first match after the last one.
    pub fn next(&mut self) -> Option<usize> {
        let len = self.positions.len();
        if len == 0 {
            return None;
        }
        let index = match self.current {
            Some(i) => (i + 1) % len,
            None => 0,
        };
        self.current = Some(index);
        Some(self.positions[index])
    }

    /// Move the cursor back, wrapping to the last match before the first one.
    pub fn previous(&mut self) -> Option<usize> {
        let len = self.positions.len();
        if len == 0 {
            return None;
        }
        let index = match self.current {
            Some(i) => (i + len - 1) % len,
            None => len - 1,
        };
        self.current = Some(index);
        Some(self.positions[index])
    }

    /// Selection span for a match starting at `start`.
    ///
    /// The span length is the length of the search text as typed, not of the matched text, so a
    /// pattern like `c.t` selects three characters even when it matched more or fewer.
    pub fn selection_for(&self, start: usize) -> Range<usize> {
        start..start + self.query_len
    }

    /// Forget every match.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_offsets_with_multibyte_text() {
        let matches = find_all("héllo héllo", "llo", SearchOptions::default()).unwrap();
        assert_eq!(
            matches,
            vec![
                SearchMatch { start: 2, end: 5 },
                SearchMatch { start: 8, end: 11 }
            ]
        );
    }

    #[test]
    fn test_empty_matches_are_skipped() {
        let matches = find_all("aab", "a*", SearchOptions::new(true, false)).unwrap();
        assert_eq!(matches, vec![SearchMatch { start: 0, end: 2 }]);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            find_all("abc", "(", SearchOptions::default()),
            Err(SearchError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_empty_query_is_rejected() {
        assert!(matches!(
            find_all("abc", "", SearchOptions::default()),
            Err(SearchError::Validation(ValidationError::EmptyQuery))
        ));
    }
}
