//! Page type for paginated query results.

/// A page of query results with pagination information.
///
/// # Example
///
/// ```ignore
/// let mut pages = client.query::<BusinessPartner>()
///     .order_by(bp.card_code)
///     .into_pages();
///
/// while let Some(page) = pages.next().await {
///     let page = page?;
///     for partner in page.items() {
///         println!("{:?}", partner.card_code);
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Page<T> {
    items: Vec<T>,
    /// `@odata.nextLink` for fetching the next page.
    next_link: Option<String>,
    /// Total row count, when the query asked for an inline count.
    total_count: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            next_link: None,
            total_count: None,
        }
    }

    pub fn with_next_link(mut self, next_link: impl Into<String>) -> Self {
        self.next_link = Some(next_link.into());
        self
    }

    pub fn with_total_count(mut self, count: u64) -> Self {
        self.total_count = Some(count);
        self
    }

    /// Returns the rows in this page.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consumes the page and returns the rows.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref()
    }

    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are more pages available.
    pub fn has_more(&self) -> bool {
        self.next_link.is_some()
    }
}
