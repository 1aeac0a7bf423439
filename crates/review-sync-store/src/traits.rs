use async_trait::async_trait;
use chrono::NaiveDate;
use review_sync_models::Review;

use crate::error::StoreError;

/// Persistence seam for harvested reviews: the checkpoint lookup that
/// bounds an incremental crawl, and the dedup writer that merges the
/// crawl's results.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Date of the most recent stored review, or `Ok(None)` when storage
    /// is empty or no stored review carries a date. A failed lookup is an
    /// error, never silently treated as "no checkpoint".
    async fn latest_review_date(&self) -> Result<Option<NaiveDate>, StoreError>;

    /// Insert every candidate whose identity key is not already present,
    /// in input order, and return how many were actually added. The first
    /// storage error aborts the remaining writes; records inserted before
    /// the failure stay. Safe to re-run with overlapping input.
    async fn write_new(&self, reviews: &[Review]) -> Result<usize, StoreError>;
}
