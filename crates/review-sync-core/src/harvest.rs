use std::time::Instant;

use chrono::NaiveDate;
use review_sync_sources::ReviewPageSource;
use review_sync_store::ReviewStore;
use serde::Serialize;
use tracing::{info, instrument};

use crate::crawl::collect_new_reviews;
use crate::error::HarvestError;

/// Knobs for a single harvest run.
#[derive(Debug, Clone, Default)]
pub struct HarvestOptions {
    /// Ignore the stored checkpoint and crawl every page.
    pub force_full: bool,
    /// Crawl and report, but skip the write phase.
    pub dry_run: bool,
}

/// What a harvest run did, for operators and for machine output.
#[derive(Debug, Clone, Serialize)]
pub struct HarvestReport {
    /// Checkpoint the crawl was bounded by, if any.
    pub checkpoint: Option<NaiveDate>,
    /// Pages the listing advertised.
    pub total_pages: u32,
    /// Pages actually requested.
    pub pages_fetched: u32,
    /// Reviews collected by the crawl.
    pub collected: usize,
    /// Reviews actually inserted by the write phase.
    pub written: usize,
    /// Whether the crawl ended early on a previously harvested record.
    pub stopped_at_checkpoint: bool,
    pub dry_run: bool,
    pub duration_secs: f64,
}

/// Runs the harvest pipeline against an explicit source and store pair:
/// checkpoint lookup, bounded crawl, dedup write. Each phase finishes
/// before the next starts, and the first failure ends the run.
pub struct Harvester<S, T> {
    source: S,
    store: T,
    options: HarvestOptions,
}

impl<S, T> Harvester<S, T>
where
    S: ReviewPageSource,
    T: ReviewStore,
{
    pub fn new(source: S, store: T) -> Self {
        Self {
            source,
            store,
            options: HarvestOptions::default(),
        }
    }

    pub fn with_options(mut self, options: HarvestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    #[instrument(name = "harvest", skip(self))]
    pub async fn run(&self) -> Result<HarvestReport, HarvestError> {
        let started = Instant::now();

        let checkpoint = if self.options.force_full {
            info!(
                operation = "harvest_full",
                "Full harvest requested, ignoring stored checkpoint"
            );
            None
        } else {
            let checkpoint = self
                .store
                .latest_review_date()
                .await
                .map_err(HarvestError::Checkpoint)?;
            match checkpoint {
                Some(d) => info!(
                    operation = "harvest_incremental",
                    checkpoint = %d,
                    "Harvesting reviews newer than checkpoint"
                ),
                None => info!(
                    operation = "harvest_seed",
                    "No checkpoint stored, harvesting the full listing"
                ),
            }
            checkpoint
        };

        let outcome = collect_new_reviews(&self.source, checkpoint).await?;

        let written = if self.options.dry_run {
            info!(
                operation = "dry_run",
                candidates = outcome.reviews.len(),
                "Dry run, skipping write phase"
            );
            0
        } else {
            self.store
                .write_new(&outcome.reviews)
                .await
                .map_err(HarvestError::Write)?
        };

        let report = HarvestReport {
            checkpoint,
            total_pages: outcome.total_pages,
            pages_fetched: outcome.pages_fetched,
            collected: outcome.reviews.len(),
            written,
            stopped_at_checkpoint: outcome.stopped_at_checkpoint,
            dry_run: self.options.dry_run,
            duration_secs: started.elapsed().as_secs_f64(),
        };

        info!(
            operation = "harvest_complete",
            collected = report.collected,
            written = report.written,
            pages_fetched = report.pages_fetched,
            "Harvest finished in {:.1}s",
            report.duration_secs
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use review_sync_models::Review;
    use review_sync_sources::SourceError;
    use review_sync_store::{MemoryReviewStore, StoreError};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedSource {
        pages: Vec<Vec<Review>>,
        meta_requests: AtomicU32,
        page_requests: AtomicU32,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Vec<Review>>) -> Self {
            Self {
                pages,
                meta_requests: AtomicU32::new(0),
                page_requests: AtomicU32::new(0),
            }
        }

        fn requests(&self) -> (u32, u32) {
            (
                self.meta_requests.load(Ordering::SeqCst),
                self.page_requests.load(Ordering::SeqCst),
            )
        }
    }

    #[async_trait]
    impl ReviewPageSource for ScriptedSource {
        async fn total_pages(&self) -> Result<u32, SourceError> {
            self.meta_requests.fetch_add(1, Ordering::SeqCst);
            Ok(self.pages.len() as u32)
        }

        async fn fetch_page(&self, page: u32) -> Result<Vec<Review>, SourceError> {
            self.page_requests.fetch_add(1, Ordering::SeqCst);
            Ok(self.pages[(page - 1) as usize].clone())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl ReviewPageSource for BrokenSource {
        async fn total_pages(&self) -> Result<u32, SourceError> {
            Err(SourceError::Malformed("listing unavailable".to_string()))
        }

        async fn fetch_page(&self, _page: u32) -> Result<Vec<Review>, SourceError> {
            Err(SourceError::Malformed("listing unavailable".to_string()))
        }
    }

    #[derive(Default)]
    struct FailingStore {
        fail_checkpoint: bool,
        fail_write: bool,
    }

    #[async_trait]
    impl ReviewStore for FailingStore {
        async fn latest_review_date(&self) -> Result<Option<NaiveDate>, StoreError> {
            if self.fail_checkpoint {
                return Err(StoreError::Database(mongodb::error::Error::custom(
                    "server selection timed out".to_string(),
                )));
            }
            Ok(None)
        }

        async fn write_new(&self, _reviews: &[Review]) -> Result<usize, StoreError> {
            if self.fail_write {
                return Err(StoreError::Database(mongodb::error::Error::custom(
                    "write concern failed".to_string(),
                )));
            }
            Ok(0)
        }
    }

    fn create_review(name: &str, date: Option<&str>) -> Review {
        Review {
            rating: Some(5),
            name: Some(name.to_string()),
            message: Some(format!("Review from {}", name)),
            date: date.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
        }
    }

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn two_page_listing() -> Vec<Vec<Review>> {
        vec![
            vec![
                create_review("Alice", Some("2024-02-01")),
                create_review("Bob", Some("2024-01-15")),
            ],
            vec![
                create_review("Carol", Some("2024-01-10")),
                create_review("Dave", Some("2024-01-05")),
            ],
        ]
    }

    #[tokio::test]
    async fn test_first_harvest_seeds_the_store() {
        let harvester = Harvester::new(
            ScriptedSource::new(two_page_listing()),
            MemoryReviewStore::new(),
        );

        let report = harvester.run().await.unwrap();

        assert_eq!(report.checkpoint, None);
        assert_eq!(report.collected, 4);
        assert_eq!(report.written, 4);
        assert_eq!(report.pages_fetched, 2);
        assert!(!report.stopped_at_checkpoint);
        assert_eq!(harvester.store().len().await, 4);
    }

    #[tokio::test]
    async fn test_second_harvest_collects_only_newer_reviews() {
        let store = MemoryReviewStore::new();
        store
            .write_new(&[create_review("Earlier", Some("2024-01-10"))])
            .await
            .unwrap();

        let harvester = Harvester::new(ScriptedSource::new(two_page_listing()), store);
        let report = harvester.run().await.unwrap();

        assert_eq!(report.checkpoint, Some(date("2024-01-10")));
        assert_eq!(report.collected, 2);
        assert_eq!(report.written, 2);
        assert!(report.stopped_at_checkpoint);
        assert_eq!(harvester.store().len().await, 3);
    }

    #[tokio::test]
    async fn test_rerun_after_complete_harvest_adds_nothing() {
        let harvester = Harvester::new(
            ScriptedSource::new(two_page_listing()),
            MemoryReviewStore::new(),
        );

        let first = harvester.run().await.unwrap();
        let second = harvester.run().await.unwrap();

        assert_eq!(first.written, 4);
        assert_eq!(second.checkpoint, Some(date("2024-02-01")));
        assert_eq!(second.collected, 0);
        assert_eq!(second.written, 0);
        assert!(second.stopped_at_checkpoint);
        assert_eq!(harvester.store().len().await, 4);
    }

    #[tokio::test]
    async fn test_dry_run_persists_nothing() {
        let harvester = Harvester::new(
            ScriptedSource::new(two_page_listing()),
            MemoryReviewStore::new(),
        )
        .with_options(HarvestOptions {
            dry_run: true,
            ..Default::default()
        });

        let report = harvester.run().await.unwrap();

        assert_eq!(report.collected, 4);
        assert_eq!(report.written, 0);
        assert!(report.dry_run);
        assert!(harvester.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_force_full_ignores_the_checkpoint() {
        let store = MemoryReviewStore::new();
        store
            .write_new(&[create_review("Earlier", Some("2024-01-15"))])
            .await
            .unwrap();

        let harvester = Harvester::new(
            ScriptedSource::new(vec![vec![
                create_review("Alice", Some("2024-02-01")),
                create_review("Bob", Some("2024-01-10")),
            ]]),
            store,
        )
        .with_options(HarvestOptions {
            force_full: true,
            ..Default::default()
        });

        let report = harvester.run().await.unwrap();

        // An incremental run would have stopped before the 2024-01-10
        // review; a full crawl collects it.
        assert_eq!(report.checkpoint, None);
        assert_eq!(report.collected, 2);
        assert_eq!(report.written, 2);
        assert!(!report.stopped_at_checkpoint);
        assert_eq!(harvester.store().len().await, 3);
    }

    #[tokio::test]
    async fn test_checkpoint_failure_aborts_before_any_fetch() {
        let harvester = Harvester::new(
            ScriptedSource::new(two_page_listing()),
            FailingStore {
                fail_checkpoint: true,
                ..Default::default()
            },
        );

        let result = harvester.run().await;

        assert!(matches!(result, Err(HarvestError::Checkpoint(_))));
        let Harvester { source, .. } = harvester;
        assert_eq!(source.requests(), (0, 0));
    }

    #[tokio::test]
    async fn test_crawl_failure_surfaces_and_writes_nothing() {
        let harvester = Harvester::new(BrokenSource, MemoryReviewStore::new());

        let result = harvester.run().await;

        assert!(matches!(result, Err(HarvestError::Crawl(_))));
        assert!(harvester.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_write_failure_surfaces() {
        let harvester = Harvester::new(
            ScriptedSource::new(two_page_listing()),
            FailingStore {
                fail_write: true,
                ..Default::default()
            },
        );

        let result = harvester.run().await;

        assert!(matches!(result, Err(HarvestError::Write(_))));
    }
}
