//! Pagination and the page store.
//!
//! The document is a contiguous map `1..=page_count → markup`. Exactly one page is *active*: its
//! live content sits in the [`Surface`], and its map entry may be stale until the next
//! [`PageStore::flush_active`]. Entries for every other page are authoritative.

use crate::error::{FolioError, LoadError};
use crate::surface::{Margins, Surface};
use std::collections::BTreeMap;
use tracing::debug;

/// Page frame margin applied after every content swap.
pub const PAGE_MARGIN: f32 = 50.0;

/// Serialized page contents keyed by 1-based page index.
pub type PageMap = BTreeMap<u32, String>;

/// Page store with a current-page cursor.
#[derive(Debug, Clone)]
pub struct PageStore {
    pages: PageMap,
    current_page: u32,
    page_count: u32,
    margins: Margins,
}

impl Default for PageStore {
    fn default() -> Self {
        Self::new(Margins::uniform(PAGE_MARGIN))
    }
}

impl PageStore {
    /// A one-page document whose page frame uses `margins`.
    pub fn new(margins: Margins) -> Self {
        let mut pages = PageMap::new();
        pages.insert(1, String::new());
        Self {
            pages,
            current_page: 1,
            page_count: 1,
            margins,
        }
    }

    /// The active page.
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Margins reasserted after each content swap.
    pub fn margins(&self) -> Margins {
        self.margins
    }

    /// Stored content of `index`. For the active page this may lag behind the surface.
    pub fn page(&self, index: u32) -> Option<&str> {
        self.pages.get(&index).map(String::as_str)
    }

    /// Write the surface's live content into the active page's entry.
    pub fn flush_active<S: Surface + ?Sized>(&mut self, surface: &S) {
        self.pages.insert(self.current_page, surface.markup());
    }

    /// Switch the active page: flush, load `to` into the surface, reassert margins.
    ///
    /// Pages between the old count and `to` are created empty.
    pub fn navigate<S: Surface + ?Sized>(&mut self, to: u32, surface: &mut S) -> Result<(), FolioError> {
        if to == 0 {
            return Err(FolioError::InvalidPage(to));
        }
        self.flush_active(surface);
        if to > self.page_count {
            self.page_count = to;
        }
        self.fill_gaps();

        let content = self.pages.get(&to).cloned().unwrap_or_default();
        surface.set_markup(&content)?;
        surface.set_page_margins(self.margins);
        debug!(from = self.current_page, to, "navigated page");
        self.current_page = to;
        Ok(())
    }

    /// Change the page count (the page stepper). Values below 1 are clamped.
    ///
    /// Shrinking below the active page first navigates to the new last page; pages above the new
    /// count are dropped.
    pub fn set_page_count<S: Surface + ?Sized>(&mut self, count: u32, surface: &mut S) -> Result<(), FolioError> {
        let count = count.max(1);
        if self.current_page > count {
            self.navigate(count, surface)?;
        }
        self.page_count = count;
        self.pages.retain(|index, _| *index <= count);
        self.fill_gaps();
        Ok(())
    }

    /// Flush and return the whole document `1..=page_count`.
    pub fn snapshot<S: Surface + ?Sized>(&mut self, surface: &S) -> PageMap {
        self.flush_active(surface);
        self.pages.clone()
    }

    /// Replace the whole document with `pages` and activate page 1.
    ///
    /// Every page is validated before anything is touched, so a failing load keeps the current
    /// document intact.
    pub fn replace<S: Surface + ?Sized>(&mut self, pages: PageMap, surface: &mut S) -> Result<(), FolioError> {
        for (index, markup) in &pages {
            crate::markup::from_markup(markup).map_err(|source| LoadError::Markup {
                page: *index,
                source,
            })?;
        }

        let first = pages.get(&1).cloned().unwrap_or_default();
        surface.set_markup(&first)?;
        surface.set_page_margins(self.margins);

        self.page_count = pages.keys().next_back().copied().unwrap_or(1).max(1);
        self.pages = pages;
        self.current_page = 1;
        self.fill_gaps();
        debug!(pages = self.page_count, "document replaced");
        Ok(())
    }

    fn fill_gaps(&mut self) {
        for index in 1..=self.page_count {
            self.pages.entry(index).or_default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RichTextSurface;

    #[test]
    fn test_navigate_fills_gaps() {
        let mut store = PageStore::default();
        let mut surface = RichTextSurface::new();
        store.navigate(4, &mut surface).unwrap();
        assert_eq!(store.page_count(), 4);
        assert_eq!(store.snapshot(&surface).keys().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_page_zero_is_rejected() {
        let mut store = PageStore::default();
        let mut surface = RichTextSurface::new();
        assert!(matches!(
            store.navigate(0, &mut surface),
            Err(FolioError::InvalidPage(0))
        ));
        assert_eq!(store.current_page(), 1);
    }
}
