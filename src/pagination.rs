//! Pagination over Weblate list endpoints.
//!
//! List endpoints answer with the envelope
//! `{"count": N, "next": url|null, "previous": url|null, "results": [...]}`.
//! [`Paginated`] walks the `next` links lazily, one page at a time.

use std::collections::{HashSet, VecDeque};

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::{Result, WeblateError};
use crate::transport::{decode, Transport};

/// Maximum pages to fetch (safety limit).
const MAX_PAGES: u32 = 10_000;

/// Conversion from one listed JSON object into an item.
pub trait FromListing: Sized {
    /// Build the item; `transport` is the one the listing was fetched with.
    fn from_listing(transport: &Transport, value: Value) -> Result<Self>;
}

/// One page of a list endpoint.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total number of items across all pages (if reported).
    pub count: Option<u64>,
    /// URL of the following page.
    pub next: Option<String>,
    /// URL of the preceding page.
    pub previous: Option<String>,
}

impl<T> Page<T> {
    /// Whether the server announced another page.
    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }

    /// Returns true if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Wire shape of a list response. A bare array is a single, final page.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope {
    Paged {
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<Value>,
    },
    Bare(Vec<Value>),
}

impl Envelope {
    fn into_page(self) -> Page<Value> {
        match self {
            Self::Paged {
                count,
                next,
                previous,
                results,
            } => Page {
                items: results,
                count,
                next,
                previous,
            },
            Self::Bare(items) => Page {
                count: Some(items.len() as u64),
                items,
                next: None,
                previous: None,
            },
        }
    }
}

/// Fetch and decode a single page.
///
/// # Errors
///
/// Returns an error if the request fails, the body is not a list envelope,
/// or an item cannot be built.
pub fn fetch_page<T: FromListing>(
    transport: &Transport,
    url: &str,
    query: &[(String, String)],
) -> Result<Page<T>> {
    let value = if query.is_empty() {
        transport.get(url)?
    } else {
        transport.get_with_query(url, query)?
    };
    let Page {
        items,
        count,
        next,
        previous,
    } = decode::<Envelope>(value)?.into_page();
    let items = items
        .into_iter()
        .map(|item| T::from_listing(transport, item))
        .collect::<Result<Vec<T>>>()?;
    Ok(Page {
        items,
        count,
        next,
        previous,
    })
}

/// Lazy iterator over every item of a list endpoint.
///
/// Nothing is requested at construction. A page is fetched only when the
/// items of the previous one are used up. A failed fetch is yielded once as
/// `Err` and ends the iteration; the pending `next` link is kept, so
/// [`has_more`](Self::has_more) still reports the unread rest.
///
/// # Example
///
/// ```no_run
/// use wlc::Weblate;
///
/// # fn example() -> wlc::Result<()> {
/// let weblate = Weblate::new("https://hosted.weblate.org/api/", "")?;
/// for project in weblate.list_projects() {
///     let project = project?;
///     println!("{}", project.slug()?);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Paginated<T> {
    transport: Transport,
    next_url: Option<String>,
    query: Vec<(String, String)>,
    buffer: VecDeque<T>,
    total: Option<u64>,
    pages_fetched: u32,
    page_limit: u32,
    visited: HashSet<Url>,
    failed: bool,
}

impl<T> std::fmt::Debug for Paginated<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginated")
            .field("next_url", &self.next_url)
            .field("buffered", &self.buffer.len())
            .field("total", &self.total)
            .field("pages_fetched", &self.pages_fetched)
            .field("failed", &self.failed)
            .finish()
    }
}

impl<T: FromListing> Paginated<T> {
    /// Listing starting at `url`.
    pub fn new(transport: Transport, url: impl Into<String>) -> Self {
        Self {
            transport,
            next_url: Some(url.into()),
            query: Vec::new(),
            buffer: VecDeque::new(),
            total: None,
            pages_fetched: 0,
            page_limit: MAX_PAGES,
            visited: HashSet::new(),
            failed: false,
        }
    }

    /// Add query parameters to the first request. Later pages follow the
    /// server's `next` links verbatim.
    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Fail instead of requesting more than `limit` pages.
    #[must_use]
    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit;
        self
    }

    /// Total item count reported by the server, known after the first fetch.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Whether items remain, buffered or behind a `next` link.
    ///
    /// `None` until the first page has arrived.
    pub fn has_more(&self) -> Option<bool> {
        if self.pages_fetched == 0 {
            return None;
        }
        Some(!self.buffer.is_empty() || self.next_url.is_some())
    }

    /// Number of pages requested so far.
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Fetch the page behind `next_url`, leaving it in place on failure.
    fn fetch(&mut self) -> Result<()> {
        let Some(url) = self.next_url.clone() else {
            return Ok(());
        };
        if self.pages_fetched >= self.page_limit {
            return Err(WeblateError::Protocol(format!(
                "Pagination stopped after {} pages, next page was {url}",
                self.page_limit
            )));
        }

        let first = self.pages_fetched == 0;
        let mut requested = self.transport.resolve(&url)?;
        if first && !self.query.is_empty() {
            requested.query_pairs_mut().extend_pairs(&self.query);
        }
        if !self.visited.insert(requested) {
            return Err(WeblateError::Protocol(format!(
                "Pagination loop: {url} was already fetched"
            )));
        }

        let query: &[(String, String)] = if first { &self.query } else { &[] };
        let mut page = fetch_page::<T>(&self.transport, &url, query)?;
        self.pages_fetched += 1;

        tracing::debug!(
            %url,
            items = page.len(),
            count = ?page.count,
            has_next = page.has_more(),
            "fetched page"
        );

        self.total = page.count.or(self.total);
        self.next_url = page.next.take();
        self.buffer.extend(page);
        Ok(())
    }
}

impl<T: FromListing> Iterator for Paginated<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.failed || self.next_url.is_none() {
                return None;
            }
            if let Err(e) = self.fetch() {
                self.failed = true;
                return Some(Err(e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_paged() {
        let value = serde_json::json!({
            "count": 3,
            "next": "http://127.0.0.1:8000/api/projects/?page=2",
            "previous": null,
            "results": [{"slug": "a"}, {"slug": "b"}]
        });
        let page = decode::<Envelope>(value).unwrap().into_page();
        assert_eq!(page.len(), 2);
        assert_eq!(page.count, Some(3));
        assert!(page.has_more());
    }

    #[test]
    fn test_envelope_bare_array_is_final() {
        let value = serde_json::json!([{"code": "cs"}, {"code": "de"}]);
        let page = decode::<Envelope>(value).unwrap().into_page();
        assert_eq!(page.len(), 2);
        assert_eq!(page.count, Some(2));
        assert!(!page.has_more());
    }

    #[test]
    fn test_envelope_requires_results() {
        let value = serde_json::json!({"detail": "Not found."});
        assert!(decode::<Envelope>(value).is_err());
    }

    #[test]
    fn test_page_into_iter() {
        let page = Page {
            items: vec![1, 2, 3],
            count: Some(3),
            next: None,
            previous: None,
        };
        assert!(!page.has_more());
        assert_eq!(page.into_iter().sum::<i32>(), 6);
    }
}
