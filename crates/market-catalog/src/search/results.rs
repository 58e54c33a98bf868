//! Ad pages and limit/offset pagination.

use crate::ids::CategoryId;
use serde::{Deserialize, Serialize};

/// Default page size.
pub const DEFAULT_PAGE_LIMIT: usize = 20;

/// Largest accepted page size.
pub const MAX_PAGE_LIMIT: usize = 100;

/// A limit/offset page window.
///
/// Deserialized windows go through [`Pagination::new`], so the limit is
/// always in `1..=MAX_PAGE_LIMIT`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "PageParams")]
pub struct Pagination {
    /// Items per page.
    pub limit: usize,
    /// Items skipped before the page.
    pub offset: usize,
}

impl Pagination {
    /// Create a page window. The limit is clamped to `1..=MAX_PAGE_LIMIT`.
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
            offset,
        }
    }

    /// Offset of the following page, if any items remain after this one.
    pub fn next_offset(&self, count: usize) -> Option<usize> {
        self.offset
            .checked_add(self.limit)
            .filter(|next| *next < count)
    }

    /// Offset of the preceding page, if this is not the first page.
    pub fn previous_offset(&self) -> Option<usize> {
        (self.offset > 0).then(|| self.offset.saturating_sub(self.limit))
    }
}

/// Raw page parameters as they arrive from a request or config.
#[derive(Deserialize)]
struct PageParams {
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    offset: usize,
}

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

impl From<PageParams> for Pagination {
    fn from(params: PageParams) -> Self {
        Self::new(params.limit, params.offset)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT, 0)
    }
}

/// One page of a filtered ad list.
///
/// `lca_category` is the lowest common ancestor of the categories of the
/// whole filtered set, not just this page. It is `None` when the set is empty
/// or the list was not built with [`with_lca_category`](Self::with_lca_category).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdPage<T> {
    /// Size of the whole filtered set.
    pub count: usize,
    /// Items on this page.
    pub results: Vec<T>,
    pub next_offset: Option<usize>,
    pub previous_offset: Option<usize>,
    pub lca_category: Option<CategoryId>,
}

impl<T> AdPage<T> {
    /// Cut one page out of the whole filtered set.
    pub fn paginate(items: Vec<T>, pagination: Pagination) -> Self {
        let count = items.len();
        let results = items
            .into_iter()
            .skip(pagination.offset)
            .take(pagination.limit)
            .collect();

        Self {
            count,
            results,
            next_offset: pagination.next_offset(count),
            previous_offset: pagination.previous_offset(),
            lca_category: None,
        }
    }

    /// Attach the LCA of the filtered set.
    pub fn with_lca_category(mut self, lca: Option<CategoryId>) -> Self {
        self.lca_category = if self.count == 0 { None } else { lca };
        self
    }

    /// Convert the items, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> AdPage<U> {
        AdPage {
            count: self.count,
            results: self.results.into_iter().map(f).collect(),
            next_offset: self.next_offset,
            previous_offset: self.previous_offset,
            lca_category: self.lca_category,
        }
    }

    /// Check if the page has no items.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(Pagination::new(0, 0).limit, 1);
        assert_eq!(Pagination::new(1_000, 0).limit, MAX_PAGE_LIMIT);
        assert_eq!(Pagination::default().limit, DEFAULT_PAGE_LIMIT);
    }

    #[test]
    fn test_huge_offset_has_no_next_page() {
        let page = AdPage::paginate(vec![1, 2, 3], Pagination::new(20, usize::MAX));
        assert_eq!(page.count, 3);
        assert!(page.results.is_empty());
        assert_eq!(page.next_offset, None);
        assert_eq!(page.previous_offset, Some(usize::MAX - 20));
    }

    #[test]
    fn test_deserialized_limit_is_clamped() {
        let zero: Pagination = serde_json::from_str(r#"{"limit": 0, "offset": 5}"#).unwrap();
        assert_eq!(zero, Pagination::new(1, 5));
        assert_eq!(zero.next_offset(10), Some(6));

        let huge: Pagination = serde_json::from_str(r#"{"limit": 5000}"#).unwrap();
        assert_eq!(huge, Pagination::new(MAX_PAGE_LIMIT, 0));

        let empty: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, Pagination::default());
    }

    #[test]
    fn test_page_links() {
        let items: Vec<u32> = (0..25).collect();

        let first = AdPage::paginate(items.clone(), Pagination::new(10, 0));
        assert_eq!(first.count, 25);
        assert_eq!(first.results, (0..10).collect::<Vec<_>>());
        assert_eq!(first.next_offset, Some(10));
        assert_eq!(first.previous_offset, None);

        let last = AdPage::paginate(items.clone(), Pagination::new(10, 20));
        assert_eq!(last.results.len(), 5);
        assert_eq!(last.next_offset, None);
        assert_eq!(last.previous_offset, Some(10));

        let odd = AdPage::paginate(items, Pagination::new(10, 4));
        assert_eq!(odd.previous_offset, Some(0));
    }

    #[test]
    fn test_lca_dropped_for_empty_set() {
        let empty: AdPage<u32> = AdPage::paginate(Vec::new(), Pagination::default())
            .with_lca_category(Some(CategoryId::new("cars")));
        assert!(empty.is_empty());
        assert_eq!(empty.lca_category, None);

        let page = AdPage::paginate(vec![1, 2], Pagination::default())
            .with_lca_category(Some(CategoryId::new("cars")))
            .map(|n| n * 10);
        assert_eq!(page.results, vec![10, 20]);
        assert_eq!(page.lca_category, Some(CategoryId::new("cars")));
    }
}
