use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use review_sync_models::{Review, ReviewKey};
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::traits::ReviewStore;

/// In-memory review store. Implements dedup as find-then-insert over a
/// key set, which keeps the same observable contract as the MongoDB
/// upsert path. Backs pipeline tests and dry analysis where nothing
/// should persist.
#[derive(Default)]
pub struct MemoryReviewStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    keys: HashSet<ReviewKey>,
    reviews: Vec<Review>,
}

impl MemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything stored so far, in insertion order.
    pub async fn snapshot(&self) -> Vec<Review> {
        self.inner.lock().await.reviews.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.reviews.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.reviews.is_empty()
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn latest_review_date(&self) -> Result<Option<NaiveDate>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.reviews.iter().filter_map(|review| review.date).max())
    }

    async fn write_new(&self, reviews: &[Review]) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock().await;
        let mut added = 0;

        for review in reviews {
            if inner.keys.insert(review.key()) {
                inner.reviews.push(review.clone());
                added += 1;
            }
        }

        Ok(added)
    }
}
