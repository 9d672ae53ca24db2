//! Fixed-size pages over the effective result list.

use std::ops::Range;

/// One-based page cursor with a fixed page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: usize,
}

impl Pagination {
    /// Create a cursor on page 1. A zero page size is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Current page, starting at 1.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Entries per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages for `count` items. Never less than 1.
    pub fn total_pages(&self, count: usize) -> usize {
        count.div_ceil(self.page_size).max(1)
    }

    /// Advance one page. Returns `false` at the last page.
    pub fn next(&mut self, count: usize) -> bool {
        if self.page < self.total_pages(count) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page. Returns `false` at the first page.
    pub fn prev(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Back to page 1.
    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Index range of the current page within `count` items.
    ///
    /// A page past the end (after the list shrank) yields the last page.
    pub fn range(&self, count: usize) -> Range<usize> {
        let page = self.page.min(self.total_pages(count));
        let start = (page - 1) * self.page_size;
        start.min(count)..(start + self.page_size).min(count)
    }

    /// The current page of `items`.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range(items.len())]
    }
}
