pub mod crawl;
pub mod error;
pub mod harvest;

pub use crawl::{collect_new_reviews, CrawlOutcome};
pub use error::HarvestError;
pub use harvest::{HarvestOptions, HarvestReport, Harvester};
