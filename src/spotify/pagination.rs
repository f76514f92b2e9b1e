use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::{
    error::{ExportError, Result},
    spotify::client::SpotifyClient,
    types::Page,
};

pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Items of a fully walked collection, in server order.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    pub items: Vec<T>,
    /// `total` as reported by the first page, if the endpoint provides one.
    pub declared_total: Option<u64>,
}

/// Walks a cursor-paginated collection one page at a time.
///
/// Each call to [`PageWalker::next_page`] fetches the page the previous one
/// pointed at. The walk ends when a page has no `next` cursor, when a fetch
/// fails (the walker is fused afterwards), or when the page bound is hit.
pub struct PageWalker<'a, T> {
    client: &'a SpotifyClient,
    start_url: String,
    next: Option<String>,
    pages_fetched: usize,
    max_pages: usize,
    declared_total: Option<u64>,
    _item: PhantomData<T>,
}

impl<'a, T: DeserializeOwned> PageWalker<'a, T> {
    /// Creates a walker positioned before the first page.
    ///
    /// Nothing is fetched until [`PageWalker::next_page`] is called.
    ///
    /// # Arguments
    ///
    /// * `client` - Authenticated client used for every page
    /// * `start_url` - Absolute URL of the first page
    ///
    /// # Example
    ///
    /// ```
    /// let walker = PageWalker::<PlaylistRecord>::new(&client, playlists_url(&client))
    ///     .with_max_pages(config::max_pages());
    /// ```
    pub fn new(client: &'a SpotifyClient, start_url: impl Into<String>) -> Self {
        let start_url = start_url.into();
        Self {
            client,
            next: Some(start_url.clone()),
            start_url,
            pages_fetched: 0,
            max_pages: DEFAULT_MAX_PAGES,
            declared_total: None,
            _item: PhantomData,
        }
    }

    /// Sets the page bound. Values below one are raised to one.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn declared_total(&self) -> Option<u64> {
        self.declared_total
    }

    /// Fetches the next page of the collection.
    ///
    /// # Returns
    ///
    /// - `Some(Ok(page))` for every page, in server order
    /// - `Some(Err(_))` once, when a fetch fails or the page bound is hit;
    ///   the walker is fused afterwards
    /// - `None` after the last page (no `next` cursor) or after an error
    ///
    /// # Errors
    ///
    /// Everything [`SpotifyClient::get_json`] returns, plus
    /// `ExportError::PageLimit` (naming the start URL) when another page is
    /// announced after `max_pages` pages were fetched.
    ///
    /// # Example
    ///
    /// ```
    /// while let Some(page) = walker.next_page().await {
    ///     let page = page?;
    ///     println!("{} items", page.items.len());
    /// }
    /// ```
    pub async fn next_page(&mut self) -> Option<Result<Page<T>>> {
        let url = self.next.take()?;

        if self.pages_fetched >= self.max_pages {
            tracing::error!(url = %self.start_url, max_pages = self.max_pages, "page bound reached");
            return Some(Err(ExportError::PageLimit {
                url: self.start_url.clone(),
                max_pages: self.max_pages,
            }));
        }

        match self.client.get_json::<Page<T>>(&url).await {
            Ok(page) => {
                if self.pages_fetched == 0 {
                    self.declared_total = page.total;
                }
                self.pages_fetched += 1;
                self.next = page.next.clone().filter(|next| !next.is_empty());
                tracing::debug!(
                    url = %url,
                    items = page.items.len(),
                    has_next = self.next.is_some(),
                    "fetched page"
                );
                Some(Ok(page))
            }
            Err(e) => {
                tracing::error!(url = %url, error = %e, "page fetch failed");
                Some(Err(e))
            }
        }
    }

    /// Drains the walker, concatenating every page's items.
    ///
    /// # Returns
    ///
    /// A [`Collection`] with every item and the `total` the first page
    /// declared.
    ///
    /// # Errors
    ///
    /// The first error [`PageWalker::next_page`] yields. No partial result is
    /// returned: a failed page never looks like a shorter collection.
    pub async fn collect(mut self) -> Result<Collection<T>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await {
            items.extend(page?.items);
        }

        Ok(Collection {
            items,
            declared_total: self.declared_total,
        })
    }
}

/// Fetches every item reachable from `start_url`.
///
/// Shorthand for a [`PageWalker`] with the given bound, drained with
/// [`PageWalker::collect`], when the declared total is not needed.
///
/// # Arguments
///
/// * `client` - Authenticated client
/// * `start_url` - Absolute URL of the first page
/// * `max_pages` - Page bound of the walk
///
/// # Errors
///
/// Same as [`PageWalker::collect`].
///
/// # Example
///
/// ```
/// let items: Vec<PlaylistItem> = fetch_all(&client, &href, 1000).await?;
/// ```
pub async fn fetch_all<T: DeserializeOwned>(
    client: &SpotifyClient,
    start_url: &str,
    max_pages: usize,
) -> Result<Vec<T>> {
    let collection = PageWalker::new(client, start_url)
        .with_max_pages(max_pages)
        .collect()
        .await?;
    Ok(collection.items)
}
