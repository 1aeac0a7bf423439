use thiserror::Error;

/// Storage failure surfaced by checkpoint reads and record writes. The
/// caller decides what it aborts: a failed checkpoint lookup stops the
/// run before anything is fetched, a failed write stops mid-batch.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage operation failed: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("failed to encode review for storage: {0}")]
    Encode(#[from] mongodb::bson::ser::Error),
}
