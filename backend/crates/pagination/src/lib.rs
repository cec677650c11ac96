//! Page-request and pagination envelope primitives.
//!
//! Endpoints that return collections accept a [`PageRequest`] (1-based page
//! number plus a bounded page size) and reply with a [`Page`] envelope that
//! carries the items together with the totals clients need to render pagers.
//! Keeping these types in a dedicated crate stops each endpoint from growing
//! its own subtly different envelope shape.

use serde::{Deserialize, Serialize};

/// Page size applied when the client does not ask for one.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Upper bound on the page size a client may request.
pub const MAX_PER_PAGE: u32 = 100;

/// Validation failures raised when constructing a [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// Page numbers are 1-based; zero is not addressable.
    #[error("page must be at least 1")]
    ZeroPage,
    /// A page must hold at least one item.
    #[error("perPage must be at least 1")]
    ZeroPerPage,
    /// The requested page size exceeds the service-wide cap.
    #[error("perPage must be at most {max}")]
    PerPageTooLarge {
        /// The configured cap the request exceeded.
        max: u32,
    },
}

/// Validated request for one page of a collection.
///
/// ## Invariants
/// - `page >= 1` (1-based numbering).
/// - `1 <= per_page <= MAX_PER_PAGE`.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(2, 25)?;
/// assert_eq!(request.offset(), 25);
/// assert_eq!(request.limit(), 25);
/// # Ok::<(), pagination::PageRequestError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "PageRequestDto", into = "PageRequestDto")]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Validate and construct a page request.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when `page` or `per_page` is zero, or when
    /// `per_page` exceeds [`MAX_PER_PAGE`].
    pub const fn new(page: u32, per_page: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if per_page == 0 {
            return Err(PageRequestError::ZeroPerPage);
        }
        if per_page > MAX_PER_PAGE {
            return Err(PageRequestError::PerPageTooLarge { max: MAX_PER_PAGE });
        }
        Ok(Self { page, per_page })
    }

    /// Construct a request from optional query parameters, applying defaults.
    ///
    /// Missing values fall back to page 1 and [`DEFAULT_PER_PAGE`].
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when a supplied value is out of range.
    pub const fn from_query(
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<Self, PageRequestError> {
        let page = match page {
            Some(value) => value,
            None => 1,
        };
        let per_page = match per_page {
            Some(value) => value,
            None => DEFAULT_PER_PAGE,
        };
        Self::new(page, per_page)
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// The number of items per page.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of items to skip before this page begins.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }

    /// Number of items this page holds at most.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageRequestDto {
    page: u32,
    per_page: u32,
}

impl From<PageRequest> for PageRequestDto {
    fn from(value: PageRequest) -> Self {
        Self {
            page: value.page,
            per_page: value.per_page,
        }
    }
}

impl TryFrom<PageRequestDto> for PageRequest {
    type Error = PageRequestError;

    fn try_from(value: PageRequestDto) -> Result<Self, Self::Error> {
        Self::new(value.page, value.per_page)
    }
}

/// Sort direction for ordered collection reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order (the default for recency-sorted feeds).
    #[default]
    Desc,
}

/// One page of results plus the totals needed to render a pager.
///
/// # Examples
/// ```
/// use pagination::{Page, PageRequest};
///
/// let request = PageRequest::new(1, 2)?;
/// let page = Page::new(vec!["a", "b"], &request, 5);
/// assert_eq!(page.total_pages(), 3);
/// assert!(page.has_next());
/// # Ok::<(), pagination::PageRequestError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    items: Vec<T>,
    page: u32,
    per_page: u32,
    total_items: u64,
}

impl<T> Page<T> {
    /// Assemble a page envelope from loaded items and the overall item count.
    #[must_use]
    pub fn new(items: Vec<T>, request: &PageRequest, total_items: u64) -> Self {
        Self {
            items,
            page: request.page(),
            per_page: request.per_page(),
            total_items,
        }
    }

    /// An empty first page, used when a filter matches nothing.
    #[must_use]
    pub fn empty(request: &PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Items on this page, in result order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        self.items.as_slice()
    }

    /// Consume the envelope and return the items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// The 1-based page number this envelope holds.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// The page size the envelope was produced with.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Total matching items across all pages.
    #[must_use]
    pub const fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Total number of pages for this result set.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_items.div_ceil(self.per_page as u64)
    }

    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        (self.page as u64) < self.total_pages()
    }

    /// Map the envelope's items while keeping the pagination metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_items: self.total_items,
        }
    }
}
