pub mod date;
pub mod review;

pub use date::parse_listing_date;
pub use review::{Review, ReviewKey};
