//! Paginated cursor implementation

use super::types::{PageFetcher, PAGE_SIZE};
use crate::error::{Error, Result};
use crate::types::CREATED_AT;
use futures::stream::{self, BoxStream, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Pull-based iterator over every object of a collection
///
/// Created without any I/O; the first page is fetched on the first call to
/// [`next`](Self::next). Not restartable: build a new cursor to scan again.
///
/// A page holding fewer than [`PAGE_SIZE`] records is taken as the last one,
/// so the backend must allow `limit=1000` (a Parse Server `maxLimit` below
/// that truncates the scan).
pub struct Cursor<'a, F: PageFetcher + ?Sized> {
    fetcher: &'a F,
    collection: String,
    filter: String,

    page: Vec<Value>,
    index: usize,
    processed: u64,
    fetched: bool,
    exhausted: bool,
    last_error: Option<Error>,
}

impl<'a, F: PageFetcher + ?Sized> Cursor<'a, F> {
    /// Create a cursor over `collection` restricted by `filter` (empty = all)
    pub fn new(fetcher: &'a F, collection: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            fetcher,
            collection: collection.into(),
            filter: filter.into(),
            page: Vec::new(),
            index: 0,
            processed: 0,
            fetched: false,
            exhausted: false,
            last_error: None,
        }
    }

    /// Return the next record, or `None` once the scan is over
    ///
    /// `None` means either clean exhaustion or a failed fetch; use
    /// [`last_error`](Self::last_error) to tell them apart.
    pub async fn next(&mut self) -> Option<Value> {
        if self.exhausted {
            return None;
        }

        if !self.fetched || self.index >= self.page.len() {
            // A short page was the last one. This relies on the backend
            // honouring `limit = PAGE_SIZE`; a lower server-side cap ends
            // the scan after its first page.
            if self.fetched && self.page.len() < PAGE_SIZE as usize {
                debug!(
                    collection = %self.collection,
                    page_len = self.page.len(),
                    "Short page, no further fetch"
                );
                self.finish();
                return None;
            }
            if !self.refill().await {
                return None;
            }
        }

        let record = std::mem::take(&mut self.page[self.index]);
        self.index += 1;
        self.processed += 1;
        Some(record)
    }

    /// Error that ended the scan, if any
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Number of records handed out so far
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Collection being scanned
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Filter expression sent with every page request
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Whether the scan has ended, cleanly or not
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Stream of the remaining records
    ///
    /// The cursor stays borrowed, so [`last_error`](Self::last_error) can be
    /// checked once the stream has ended.
    pub fn records(&mut self) -> BoxStream<'_, Value> {
        stream::unfold(self, |cursor| async move {
            let record = cursor.next().await?;
            Some((record, cursor))
        })
        .boxed()
    }

    /// Stream of the remaining records decoded into `T`
    ///
    /// A record that does not decode is yielded as an error item and the
    /// scan continues; it is not recorded as the cursor's error.
    pub fn decoded<T>(&mut self) -> BoxStream<'_, Result<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.records()
            .map(|record| serde_json::from_value(record).map_err(Error::from))
            .boxed()
    }

    async fn refill(&mut self) -> bool {
        debug!(
            collection = %self.collection,
            offset = self.processed,
            "Fetching page"
        );

        let result = self
            .fetcher
            .fetch_page(
                &self.collection,
                &self.filter,
                PAGE_SIZE,
                CREATED_AT,
                self.processed,
            )
            .await;

        self.fetched = true;
        self.index = 0;

        match result {
            Ok(records) if records.is_empty() => {
                self.page = records;
                self.finish();
                false
            }
            Ok(records) => {
                debug!(
                    collection = %self.collection,
                    count = records.len(),
                    "Fetched page"
                );
                self.page = records;
                true
            }
            Err(e) => {
                warn!(
                    collection = %self.collection,
                    offset = self.processed,
                    "Page fetch failed: {e}"
                );
                self.page = Vec::new();
                self.last_error = Some(e);
                self.exhausted = true;
                false
            }
        }
    }

    fn finish(&mut self) {
        debug!(
            collection = %self.collection,
            processed = self.processed,
            "Scan complete"
        );
        self.page = Vec::new();
        self.exhausted = true;
    }
}

impl<F: PageFetcher + ?Sized> std::fmt::Debug for Cursor<'_, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("collection", &self.collection)
            .field("filter", &self.filter)
            .field("processed", &self.processed)
            .field("exhausted", &self.exhausted)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}
