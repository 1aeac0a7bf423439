use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One feedback record as extracted from a listing page.
///
/// Every field is optional: extraction can fail per field, and older
/// stored records never captured a date. Records are immutable once
/// created; a crawl run holds them in memory until the writer either
/// persists or discards them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub rating: Option<u32>, // star count; not part of the dedup key
    pub name: Option<String>,
    pub message: Option<String>,
    pub date: Option<NaiveDate>, // ordering/checkpoint field, ISO string in storage
}

impl Review {
    /// The natural key used to decide whether this record already exists
    /// in storage. Two records differing only in `rating` share a key.
    pub fn key(&self) -> ReviewKey {
        ReviewKey {
            name: self.name.clone(),
            message: self.message.clone(),
            date: self.date,
        }
    }
}

/// Dedup key tuple: (name, message) at minimum, date included when present
/// to disambiguate distinct reviews from the same author with the same text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReviewKey {
    pub name: Option<String>,
    pub message: Option<String>,
    pub date: Option<NaiveDate>,
}
