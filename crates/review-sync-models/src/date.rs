use chrono::NaiveDate;

/// Parse a publication date as printed on listing pages.
///
/// Listing pages separate date components with dots (`2024.01.15`);
/// stored records use ISO dashes. Both forms parse here. Anything else
/// yields `None`: the record is still kept, it just can never satisfy the
/// crawler's stop condition or become a checkpoint.
pub fn parse_listing_date(raw: &str) -> Option<NaiveDate> {
    let normalized = raw.trim().replace('.', "-");
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_dotted_listing_form() {
        assert_eq!(
            parse_listing_date("2024.01.15"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn test_parses_iso_form() {
        assert_eq!(
            parse_listing_date(" 2024-01-15 "),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn test_rejects_unparseable_input() {
        assert_eq!(parse_listing_date(""), None);
        assert_eq!(parse_listing_date("yesterday"), None);
        assert_eq!(parse_listing_date("15.01.2024"), None);
        assert_eq!(parse_listing_date("2024.13.01"), None);
    }
}
