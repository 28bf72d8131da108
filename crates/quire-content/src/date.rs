//! Publish date parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Date used when a document's date is malformed or missing where required.
pub const FALLBACK_DATE: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

/// Error parsing a front matter date.
#[derive(Debug, thiserror::Error)]
pub enum DateError {
    /// The value matches neither `yyyy-MM-dd` nor `yyyy-MM-ddTHH:mm`.
    #[error("Invalid date '{value}': expected yyyy-MM-dd or yyyy-MM-ddTHH:mm")]
    Invalid {
        /// The offending value.
        value: String,
    },
}

/// Parse a publish date as UTC.
///
/// Accepts `yyyy-MM-dd` and `yyyy-MM-ddTHH:mm`.
///
/// # Examples
///
/// ```
/// use quire_content::parse_date;
///
/// let date = parse_date("2024-03-01T09:30").unwrap();
/// assert_eq!(date.to_rfc3339(), "2024-03-01T09:30:00+00:00");
/// assert!(parse_date("March 1st").is_err());
/// ```
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, DateError> {
    let value = value.trim();
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN)));

    naive
        .map(|dt| dt.and_utc())
        .map_err(|_| DateError::Invalid {
            value: value.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_only() {
        let date = parse_date("2021-12-24").unwrap();
        assert_eq!(date.to_rfc3339(), "2021-12-24T00:00:00+00:00");
    }

    #[test]
    fn test_parse_date_with_time() {
        let date = parse_date("2021-12-24T18:05").unwrap();
        assert_eq!(date.to_rfc3339(), "2021-12-24T18:05:00+00:00");
    }

    #[test]
    fn test_parse_date_trims_whitespace() {
        assert!(parse_date(" 2021-12-24 ").is_ok());
    }

    #[test]
    fn test_parse_date_rejects_other_formats() {
        for value in ["24.12.2021", "2021-13-01", "2021-12-24 18:05", "", "2021-12-24T18"] {
            let err = parse_date(value).unwrap_err();
            assert!(err.to_string().contains("Invalid date"), "value: {value:?}");
        }
    }

    #[test]
    fn test_fallback_is_epoch() {
        assert_eq!(FALLBACK_DATE.timestamp(), 0);
    }
}
