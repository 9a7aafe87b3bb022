use std::num::NonZeroUsize;

use crate::config::Config;

pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(4) {
    Some(size) => size,
    None => unreachable!(),
};

/// Page position over a collection. Pages are 1-based.
///
/// The pager only remembers how many items it last saw; the visible
/// slice is always derived from the collection handed to [`Pager::page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_index: usize,
    page_size: NonZeroUsize,
    total_items: usize,
}

/// Read-only window over one page of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageView<'a, T> {
    pub page_index: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub slice: &'a [T],
}

impl<'a, T> PageView<'a, T> {
    pub fn has_next(&self) -> bool {
        self.page_index < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page_index > 1
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            page_index: 1,
            page_size,
            total_items: 0,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.page_size)
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.page_size.get())
    }

    /// Records the collection size and clamps the page index so it never
    /// points past the last page.
    pub fn recompute(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.page_index = self.page_index.clamp(1, self.total_pages().max(1));
    }

    /// Returns `false` when already on the last page.
    ///
    /// The last page is judged from the item count seen by the most recent
    /// [`Pager::page`] or [`Pager::recompute`]; call one of them after the
    /// collection changes.
    pub fn next(&mut self) -> bool {
        if self.page_index < self.total_pages() {
            self.page_index += 1;
            true
        } else {
            false
        }
    }

    /// Returns `false` when already on the first page.
    pub fn previous(&mut self) -> bool {
        if self.page_index > 1 {
            self.page_index -= 1;
            true
        } else {
            false
        }
    }

    /// Recomputes against `items` and returns the visible slice.
    pub fn page<'a, T>(&mut self, items: &'a [T]) -> PageView<'a, T> {
        self.recompute(items.len());

        let size = self.page_size.get();
        let start = ((self.page_index - 1) * size).min(items.len());
        let end = (start + size).min(items.len());

        PageView {
            page_index: self.page_index,
            page_size: size,
            total_pages: self.total_pages(),
            slice: &items[start..end],
        }
    }
}
