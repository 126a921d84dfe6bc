//! Page-by-page collection of GitHub list endpoints.
//!
//! GitHub list endpoints are walked with a fixed page size until a page comes
//! back empty. The total count is never assumed up front, so a collection that
//! grows while it is being read is still drained completely.

use std::future::Future;

use serde::Serialize;

/// Page size used for every list call.
pub const PAGE_SIZE: u8 = 100;

/// Query parameters selecting one page of a list endpoint.
///
/// # Example
///
/// ```
/// use lanesync::github::pagination::PageRequest;
///
/// let request = PageRequest::first(50);
/// assert_eq!(request.page(), 1);
/// assert_eq!(request.next().page(), 2);
/// assert_eq!(request.next().per_page(), 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    per_page: u8,
    page: u32,
}

impl PageRequest {
    /// Request for the first page (1-based) with the given size.
    #[must_use]
    pub const fn first(per_page: u8) -> Self {
        Self { per_page, page: 1 }
    }

    /// Request for the page following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            per_page: self.per_page,
            page: self.page.saturating_add(1),
        }
    }

    /// Current page number (1-based).
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Items per page.
    #[must_use]
    pub const fn per_page(&self) -> u8 {
        self.per_page
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(PAGE_SIZE)
    }
}

/// Fetches pages with `fetch_page` until one comes back empty and returns the
/// concatenated items.
///
/// # Errors
///
/// Returns the first error produced by `fetch_page`; items gathered so far
/// are discarded.
pub async fn collect_until_empty<T, E, F, Fut>(
    per_page: u8,
    mut fetch_page: F,
) -> Result<Vec<T>, E>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let mut items = Vec::new();
    let mut request = PageRequest::first(per_page);

    loop {
        let page = fetch_page(request).await?;
        if page.is_empty() {
            return Ok(items);
        }
        items.extend(page);
        request = request.next();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use rstest::rstest;

    use super::{PageRequest, collect_until_empty};

    #[rstest]
    #[tokio::test]
    async fn collects_until_an_empty_page_arrives() {
        let requested = RefCell::new(Vec::new());
        let pages = vec![vec![1, 2], vec![3], Vec::new(), vec![99]];

        let items: Vec<i32> = collect_until_empty(2, |request: PageRequest| {
            requested.borrow_mut().push(request.page());
            let index = usize::try_from(request.page()).unwrap_or(usize::MAX) - 1;
            let page = pages.get(index).cloned().unwrap_or_default();
            async move { Ok::<_, String>(page) }
        })
        .await
        .expect("collection should succeed");

        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(*requested.borrow(), vec![1, 2, 3]);
    }

    #[rstest]
    #[tokio::test]
    async fn short_pages_do_not_stop_collection() {
        let pages = vec![vec!["a"], vec!["b"], Vec::new()];

        let items = collect_until_empty(100, |request: PageRequest| {
            let index = usize::try_from(request.page()).unwrap_or(usize::MAX) - 1;
            let page = pages.get(index).cloned().unwrap_or_default();
            async move { Ok::<_, String>(page) }
        })
        .await
        .expect("collection should succeed");

        assert_eq!(items, vec!["a", "b"]);
    }

    #[rstest]
    #[tokio::test]
    async fn propagates_page_errors() {
        let result: Result<Vec<u8>, String> = collect_until_empty(10, |request: PageRequest| {
            let outcome = if request.page() == 1 {
                Ok(vec![1])
            } else {
                Err(format!("page {} failed", request.page()))
            };
            async move { outcome }
        })
        .await;

        assert_eq!(result, Err("page 2 failed".to_owned()));
    }
}
