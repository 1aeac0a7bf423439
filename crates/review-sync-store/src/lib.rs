pub mod error;
pub mod memory;
pub mod mongo;
pub mod progress;
pub mod traits;

pub use error::StoreError;
pub use memory::MemoryReviewStore;
pub use mongo::MongoReviewStore;
pub use progress::WriteTracker;
pub use traits::ReviewStore;
