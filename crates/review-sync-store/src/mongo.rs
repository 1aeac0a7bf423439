use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, to_document, Bson, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use review_sync_config::StorageConfig;
use review_sync_models::Review;
use tracing::{debug, error, info};

use crate::error::StoreError;
use crate::progress::WriteTracker;
use crate::traits::ReviewStore;

/// How many records between progress log lines during a batch write
const WRITE_PROGRESS_INTERVAL: usize = 50;

/// Review collection in MongoDB. One handle is opened per run (or per
/// daemon lifetime), passed explicitly into the pipeline, and dropped
/// when the run ends.
pub struct MongoReviewStore {
    collection: Collection<Review>,
}

impl MongoReviewStore {
    /// Connect to the configured deployment and ping it, so an
    /// unreachable server fails the run here instead of on the first
    /// query.
    pub async fn connect(config: &StorageConfig) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some("reviewvault".to_string());
        options.server_selection_timeout = Some(Duration::from_secs(config.connect_timeout_secs));

        let client = Client::with_options(options)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        info!(
            operation = "store_connect",
            database = %config.database,
            collection = %config.collection,
            "Connected to review storage"
        );

        Ok(Self {
            collection: client
                .database(&config.database)
                .collection(&config.collection),
        })
    }

    /// Total number of stored reviews.
    pub async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    /// Most recently dated stored reviews, newest first. Undated records
    /// sort last, so they only appear when the limit exceeds the number
    /// of dated ones. Expects a positive limit: the driver treats zero
    /// as unbounded.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Review>, StoreError> {
        let mut cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "date": -1 })
            .limit(limit)
            .await?;

        let mut reviews = Vec::new();
        while let Some(review) = cursor.try_next().await? {
            reviews.push(review);
        }
        Ok(reviews)
    }
}

#[async_trait]
impl ReviewStore for MongoReviewStore {
    async fn latest_review_date(&self) -> Result<Option<NaiveDate>, StoreError> {
        // Dates are stored as ISO strings and BSON sorts null before any
        // string, so a descending sort on date puts the newest dated
        // record first whenever one exists.
        let newest = self
            .collection
            .find_one(doc! {})
            .sort(doc! { "date": -1 })
            .await?;

        let checkpoint = newest.and_then(|review| review.date);
        debug!(
            operation = "checkpoint_lookup",
            checkpoint = ?checkpoint,
            "Loaded harvest checkpoint"
        );
        Ok(checkpoint)
    }

    async fn write_new(&self, reviews: &[Review]) -> Result<usize, StoreError> {
        let mut tracker = WriteTracker::new(reviews.len(), WRITE_PROGRESS_INTERVAL);

        for (index, review) in reviews.iter().enumerate() {
            let document = match review_document(review) {
                Ok(document) => document,
                Err(e) => {
                    tracker.record_failed();
                    tracker.log_summary("Review write");
                    error!(
                        operation = "write_abort",
                        index = index,
                        "Failed to encode review: {}",
                        e
                    );
                    return Err(e.into());
                }
            };

            // $setOnInsert leaves already-present records untouched, so a
            // re-written duplicate can never overwrite what a prior run
            // stored.
            let update = doc! { "$setOnInsert": document };
            match self
                .collection
                .update_one(key_filter(review), update)
                .upsert(true)
                .await
            {
                Ok(result) => {
                    if result.upserted_id.is_some() {
                        tracker.record_added();
                        debug!(
                            operation = "review_added",
                            date = ?review.date,
                            "Inserted new review"
                        );
                    } else {
                        tracker.record_already_present();
                    }
                }
                Err(e) => {
                    tracker.record_failed();
                    tracker.log_summary("Review write");
                    error!(
                        operation = "write_abort",
                        index = index,
                        "Failed to write review: {}",
                        e
                    );
                    return Err(e.into());
                }
            }

            tracker.log_progress(index + 1);
        }

        tracker.log_summary("Review write");
        Ok(tracker.added())
    }
}

/// Exact-match filter for a record's identity key. Absent fields are
/// matched as null, which also matches documents missing the field, so
/// an undated candidate only ever collides with undated stored records.
fn key_filter(review: &Review) -> Document {
    doc! {
        "name": text_bson(&review.name),
        "message": text_bson(&review.message),
        "date": date_bson(review.date),
    }
}

/// Full document for a new record, rating included.
fn review_document(review: &Review) -> Result<Document, mongodb::bson::ser::Error> {
    to_document(review)
}

fn text_bson(value: &Option<String>) -> Bson {
    match value {
        Some(text) => Bson::String(text.clone()),
        None => Bson::Null,
    }
}

fn date_bson(value: Option<NaiveDate>) -> Bson {
    match value {
        Some(date) => Bson::String(date.to_string()),
        None => Bson::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_review(name: Option<&str>, message: Option<&str>, date: Option<&str>) -> Review {
        Review {
            rating: Some(5),
            name: name.map(|s| s.to_string()),
            message: message.map(|s| s.to_string()),
            date: date.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
        }
    }

    #[test]
    fn test_key_filter_serializes_date_as_iso_string() {
        let review = create_review(Some("Alice"), Some("Great tool"), Some("2024-01-15"));
        let filter = key_filter(&review);

        assert_eq!(filter.get("name"), Some(&Bson::String("Alice".to_string())));
        assert_eq!(
            filter.get("message"),
            Some(&Bson::String("Great tool".to_string()))
        );
        assert_eq!(
            filter.get("date"),
            Some(&Bson::String("2024-01-15".to_string()))
        );
    }

    #[test]
    fn test_key_filter_uses_null_for_absent_fields() {
        let review = create_review(None, Some("Great tool"), None);
        let filter = key_filter(&review);

        assert_eq!(filter.get("name"), Some(&Bson::Null));
        assert_eq!(filter.get("date"), Some(&Bson::Null));
    }

    #[test]
    fn test_key_filter_excludes_rating() {
        let review = create_review(Some("Alice"), Some("Great tool"), Some("2024-01-15"));
        let filter = key_filter(&review);

        assert!(filter.get("rating").is_none());
        assert_eq!(filter.len(), 3);
    }

    #[test]
    fn test_review_document_keeps_rating_and_null_fields() {
        let review = create_review(None, None, None);
        let document = review_document(&review).unwrap();

        assert_eq!(document.get_i32("rating").unwrap(), 5);
        assert_eq!(document.get("name"), Some(&Bson::Null));
        assert_eq!(document.get("message"), Some(&Bson::Null));
        assert_eq!(document.get("date"), Some(&Bson::Null));
    }

    #[test]
    fn test_filter_matches_document_encoding() {
        // The key filter must compare equal against the fields the
        // document writer stores, or dedup silently stops working.
        let review = create_review(Some("Alice"), Some("Great tool"), Some("2024-01-15"));
        let filter = key_filter(&review);
        let document = review_document(&review).unwrap();

        assert_eq!(filter.get("name"), document.get("name"));
        assert_eq!(filter.get("message"), document.get("message"));
        assert_eq!(filter.get("date"), document.get("date"));
    }
}
