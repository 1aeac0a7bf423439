use review_sync_sources::SourceError;
use review_sync_store::StoreError;
use thiserror::Error;

/// Why a harvest run stopped. The phases are kept apart so callers can
/// tell whether anything was fetched or persisted before the failure.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The checkpoint lookup failed. The run aborts here, before any
    /// page is requested, rather than falling back to a full crawl.
    #[error("failed to load harvest checkpoint: {0}")]
    Checkpoint(StoreError),

    /// A listing fetch or decode failed mid-crawl.
    #[error("review crawl failed: {0}")]
    Crawl(#[from] SourceError),

    /// Persisting crawled records failed. Records written before the
    /// failure stay stored; the next run picks up the rest.
    #[error("failed to persist harvested reviews: {0}")]
    Write(StoreError),
}
