//! Document info dictionary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Document metadata read from the trailer `/Info` dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Keywords
    pub keywords: Option<String>,

    /// Creator application
    pub creator: Option<String>,

    /// PDF producer
    pub producer: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,

    /// PDF version (e.g., "1.7")
    pub pdf_version: String,

    /// Total number of pages
    pub page_count: u32,

    /// Whether the document is encrypted
    pub encrypted: bool,

    /// Every string-valued entry of the info dictionary, keyed by name
    pub entries: BTreeMap<String, String>,
}

impl Metadata {
    /// Create new metadata with PDF version.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            pdf_version: version.into(),
            ..Default::default()
        }
    }

    /// Build metadata from decoded info dictionary entries.
    pub fn from_entries(version: impl Into<String>, entries: BTreeMap<String, String>) -> Self {
        let get = |key: &str| entries.get(key).filter(|v| !v.is_empty()).cloned();

        Self {
            title: get("Title"),
            author: get("Author"),
            subject: get("Subject"),
            keywords: get("Keywords"),
            creator: get("Creator"),
            producer: get("Producer"),
            created: entries.get("CreationDate").and_then(|d| parse_pdf_date(d)),
            modified: entries.get("ModDate").and_then(|d| parse_pdf_date(d)),
            pdf_version: version.into(),
            page_count: 0,
            encrypted: false,
            entries,
        }
    }
}

/// Parse a PDF date string (`D:YYYYMMDDHHmmSSOHH'mm'`).
///
/// Only the date and time fields are used; the timezone suffix is ignored.
pub fn parse_pdf_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    let s = s.strip_prefix("D:").unwrap_or(s);

    if s.len() < 4 {
        return None;
    }

    let field = |range: std::ops::Range<usize>, default: u32| -> u32 {
        s.get(range).and_then(|v| v.parse().ok()).unwrap_or(default)
    };

    let year: i32 = s.get(0..4)?.parse().ok()?;
    chrono::NaiveDate::from_ymd_opt(year, field(4..6, 1), field(6..8, 1))
        .and_then(|date| date.and_hms_opt(field(8..10, 0), field(10..12, 0), field(12..14, 0)))
        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_pdf_date() {
        let date = parse_pdf_date("D:20240115103045+03'00'").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);
        assert_eq!(date.hour(), 10);
        assert_eq!(date.second(), 45);
    }

    #[test]
    fn test_parse_pdf_date_minimal() {
        let date = parse_pdf_date("D:2024").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 1);
    }

    #[test]
    fn test_parse_pdf_date_invalid() {
        assert!(parse_pdf_date("D:20").is_none());
        assert!(parse_pdf_date("yesterday").is_none());
        assert!(parse_pdf_date("D:20241345").is_none());
    }

    #[test]
    fn test_from_entries() {
        let mut entries = BTreeMap::new();
        entries.insert("Title".to_string(), "Protocol".to_string());
        entries.insert("Author".to_string(), String::new());
        entries.insert("CreationDate".to_string(), "D:20230601".to_string());
        entries.insert("Custom".to_string(), "value".to_string());

        let metadata = Metadata::from_entries("1.4", entries);
        assert_eq!(metadata.title.as_deref(), Some("Protocol"));
        assert_eq!(metadata.author, None);
        assert_eq!(metadata.created.map(|d| d.year()), Some(2023));
        assert_eq!(metadata.entries.get("Custom").map(String::as_str), Some("value"));
        assert_eq!(metadata.pdf_version, "1.4");
    }
}
