use chrono::NaiveDate;
use review_sync_models::Review;
use review_sync_sources::{ReviewPageSource, SourceError};
use tracing::{debug, error, info};

/// What a crawl produced and how far it got.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlOutcome {
    /// Collected reviews in encounter order, newest first.
    pub reviews: Vec<Review>,
    /// Pages actually requested, including the one the crawl stopped on.
    pub pages_fetched: u32,
    /// Pages the listing advertised.
    pub total_pages: u32,
    /// Whether the crawl ended early on a previously harvested record
    /// rather than by exhausting the listing.
    pub stopped_at_checkpoint: bool,
}

/// Walks the listing newest-first and collects reviews until one dated at
/// or before the checkpoint appears. That record and everything after it
/// were harvested by an earlier run, so the crawl returns immediately
/// without requesting further pages. Without a checkpoint every page is
/// collected. Undated reviews are always collected and never end the
/// crawl.
pub async fn collect_new_reviews<S>(
    source: &S,
    checkpoint: Option<NaiveDate>,
) -> Result<CrawlOutcome, SourceError>
where
    S: ReviewPageSource + ?Sized,
{
    let total_pages = source.total_pages().await?;
    info!(
        operation = "crawl_start",
        total_pages = total_pages,
        checkpoint = ?checkpoint,
        "Starting review crawl"
    );

    let mut reviews = Vec::new();
    let mut pages_fetched = 0;

    for page in 1..=total_pages {
        let rows = match source.fetch_page(page).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(
                    operation = "crawl_abort",
                    page = page,
                    "Failed to fetch listing page: {}",
                    e
                );
                return Err(e);
            }
        };
        pages_fetched += 1;
        debug!(
            operation = "page_fetched",
            page = page,
            rows = rows.len(),
            "Fetched listing page"
        );

        for review in rows {
            if let (Some(seen), Some(date)) = (checkpoint, review.date) {
                if date <= seen {
                    info!(
                        operation = "crawl_stop",
                        page = page,
                        date = %date,
                        collected = reviews.len(),
                        "Reached previously harvested review, stopping crawl"
                    );
                    return Ok(CrawlOutcome {
                        reviews,
                        pages_fetched,
                        total_pages,
                        stopped_at_checkpoint: true,
                    });
                }
            }
            reviews.push(review);
        }
    }

    info!(
        operation = "crawl_complete",
        pages_fetched = pages_fetched,
        collected = reviews.len(),
        "Crawled every available page"
    );

    Ok(CrawlOutcome {
        reviews,
        pages_fetched,
        total_pages,
        stopped_at_checkpoint: false,
    })
}
