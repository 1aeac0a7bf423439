use crate::error::SourceError;
use async_trait::async_trait;
use review_sync_models::Review;

/// Paginated access to a seller's feedback listing.
///
/// Implementations own page navigation and record extraction; the crawler
/// only ever asks for one page of raw records at a time. Page 1 holds the
/// newest records and each subsequent page is strictly older.
#[async_trait]
pub trait ReviewPageSource: Send + Sync {
    /// Number of pages the listing currently reports.
    async fn total_pages(&self) -> Result<u32, SourceError>;

    /// All records on `page` (1-based), in listing order. Absent row
    /// fields become absent record fields, never an error.
    async fn fetch_page(&self, page: u32) -> Result<Vec<Review>, SourceError>;
}
