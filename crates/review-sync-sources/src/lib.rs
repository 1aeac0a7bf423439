pub mod error;
pub mod marketplace;
pub mod traits;

pub use error::SourceError;
pub use marketplace::FeedbackClient;
pub use traits::ReviewPageSource;
