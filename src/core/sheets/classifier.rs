// Column type detection.
//
// Each sampled value lands in at most one bucket: the detectors run in a fixed
// priority order and the first match wins. A column takes a type only when
// that type's share of the sample is strictly above the threshold.
// Reordering DETECTORS or moving the threshold changes results, so both are
// kept as named tables here rather than inlined.

use once_cell::sync::Lazy;
use regex::Regex;

use super::sheet_models::ColumnType;

/// How many non-empty values are inspected per column.
pub const SAMPLE_SIZE: usize = 10;

/// A bucket must hold strictly more than this share of the sample.
pub const TYPE_THRESHOLD: f64 = 0.7;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9\s\-+()]{8,}$").expect("valid phone regex"));
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://").expect("valid url regex"));
static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[0-9]{4}-[0-9]{2}-[0-9]{2}|[0-9]{2}/[0-9]{2}/[0-9]{4})")
        .expect("valid date regex")
});
static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(?:\.[0-9]+)?$").expect("valid number regex"));

/// Minimum number of digits a phone-shaped value must contain.
const MIN_PHONE_DIGITS: usize = 6;

type Detector = fn(&str) -> bool;

/// Detectors in priority order.
const DETECTORS: [(ColumnType, Detector); 5] = [
    (ColumnType::Email, is_email),
    (ColumnType::Phone, is_phone),
    (ColumnType::Url, is_url),
    (ColumnType::Date, is_date),
    (ColumnType::Number, is_number),
];

pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

pub fn is_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
        && value.chars().filter(|c| c.is_ascii_digit()).count() >= MIN_PHONE_DIGITS
}

pub fn is_url(value: &str) -> bool {
    URL_RE.is_match(value)
}

pub fn is_date(value: &str) -> bool {
    DATE_RE.is_match(value)
}

pub fn is_number(value: &str) -> bool {
    NUMBER_RE.is_match(value)
}

/// Bucket for a single trimmed value, `None` when no detector matches.
fn bucket_of(value: &str) -> Option<ColumnType> {
    DETECTORS
        .iter()
        .find(|(_, detect)| detect(value))
        .map(|(column_type, _)| *column_type)
}

/// Infers the semantic type of a column from its values (header excluded),
/// in original row order.
pub fn classify<S: AsRef<str>>(values: &[S]) -> ColumnType {
    let sample: Vec<&str> = values
        .iter()
        .map(|v| v.as_ref())
        .filter(|v| !v.trim().is_empty())
        .take(SAMPLE_SIZE)
        .collect();

    if sample.is_empty() {
        return ColumnType::Text;
    }

    let mut counts = [0usize; DETECTORS.len()];
    for value in &sample {
        if let Some(column_type) = bucket_of(value.trim()) {
            if let Some(slot) = DETECTORS.iter().position(|(t, _)| *t == column_type) {
                counts[slot] += 1;
            }
        }
    }

    let total = sample.len() as f64;
    DETECTORS
        .iter()
        .zip(counts.iter())
        .find(|(_, count)| **count as f64 / total > TYPE_THRESHOLD)
        .map(|((column_type, _), _)| *column_type)
        .unwrap_or(ColumnType::Text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(matching: usize, matching_value: &str, other: usize) -> Vec<String> {
        let mut values = vec![matching_value.to_string(); matching];
        values.extend(vec!["hello world".to_string(); other]);
        values
    }

    #[test]
    fn test_empty_sample_is_text() {
        let values: Vec<String> = Vec::new();
        assert_eq!(classify(&values), ColumnType::Text);
        assert_eq!(classify(&["", "   ", "\t"]), ColumnType::Text);
    }

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(
            classify(&column(8, "alice@example.com", 2)),
            ColumnType::Email
        );
        assert_eq!(
            classify(&column(7, "alice@example.com", 3)),
            ColumnType::Text
        );
    }

    #[test]
    fn test_blank_values_do_not_count() {
        // 3 emails out of 3 non-empty values, blanks are skipped entirely
        let values = ["bob@example.org", "", "  ", "eve@example.org", "joe@x.io"];
        assert_eq!(classify(&values), ColumnType::Email);
    }

    #[test]
    fn test_only_first_ten_values_are_sampled() {
        let mut values = vec!["hello".to_string(); 10];
        values.extend(vec!["https://example.com".to_string(); 50]);
        assert_eq!(classify(&values), ColumnType::Text);
    }

    #[test]
    fn test_phone_formats() {
        assert!(is_phone("0225551234"));
        assert!(is_phone("+229 61 23 45 67"));
        assert!(is_phone("(022) 555-1234"));
        // long enough but too few digits
        assert!(!is_phone("(--) 12 345"));
        // too short
        assert!(!is_phone("1234567"));
        assert!(!is_phone("022 555 12a4"));
        assert_eq!(
            classify(&["0225551234", "+229 97 00 00 01", "61 23 45 67"]),
            ColumnType::Phone
        );
    }

    #[test]
    fn test_long_digit_strings_are_phones_before_numbers() {
        assert_eq!(bucket_of("12345678"), Some(ColumnType::Phone));
        assert_eq!(bucket_of("1234567"), Some(ColumnType::Number));
        assert_eq!(classify(&["12", "3.5", "1000", "7"]), ColumnType::Number);
    }

    #[test]
    fn test_url_is_case_insensitive() {
        assert_eq!(
            classify(&["HTTPS://example.com", "http://a.b/c", "https://x.y"]),
            ColumnType::Url
        );
        assert!(!is_url("ftp://example.com"));
    }

    #[test]
    fn test_date_prefixes() {
        assert!(is_date("2024-03-01"));
        assert!(is_date("2024-03-01T10:00:00Z"));
        assert!(is_date("01/03/2024"));
        assert!(!is_date("1/3/2024"));
        assert_eq!(
            classify(&["15/04/2023", "01/01/2020", "2022-12-31T08:00"]),
            ColumnType::Date
        );
    }

    #[test]
    fn test_bare_iso_date_matches_phone_first() {
        // digits and dashes only, 8 digits: the phone detector claims it
        assert_eq!(bucket_of("2024-03-01"), Some(ColumnType::Phone));
        assert_eq!(bucket_of("2024-03-01 09:30"), Some(ColumnType::Date));
    }

    #[test]
    fn test_values_are_trimmed_before_matching() {
        assert_eq!(
            classify(&["  alice@example.com ", "\tbob@example.com"]),
            ColumnType::Email
        );
    }

    #[test]
    fn test_email_with_whitespace_is_not_email() {
        assert!(!is_email("alice smith@example.com"));
        assert!(!is_email("alice@example"));
        assert!(is_email("a.b+c@sub.example.co"));
    }

    #[test]
    fn test_mixed_column_falls_back_to_text() {
        let values = [
            "alice@example.com",
            "0225551234",
            "https://example.com",
            "2024-01-01",
            "42",
        ];
        assert_eq!(classify(&values), ColumnType::Text);
    }
}
