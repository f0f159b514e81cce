//! Cursor types and traits

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Maximum number of results the backend returns per query
pub const PAGE_SIZE: u32 = 1000;

/// Source of result pages for a [`Cursor`](super::Cursor)
///
/// Implementations must return records in the requested `order`, skip
/// exactly `offset` matching records and return at most `limit`. An empty
/// result is a valid answer meaning there is nothing left at that offset.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one page of `collection` matching `filter`
    async fn fetch_page(
        &self,
        collection: &str,
        filter: &str,
        limit: u32,
        order: &str,
        offset: u64,
    ) -> Result<Vec<Value>>;
}
