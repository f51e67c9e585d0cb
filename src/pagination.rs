/// Default page size for bucket listings.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 50;

/// One-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Number of items to skip; page numbers below one are treated as one.
    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1) * self.per_page
    }

    /// Returns the slice of `items` this page covers.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset())
            .take(self.per_page)
            .collect()
    }
}
