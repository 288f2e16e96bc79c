//! TVL record representation and date normalization.

use chrono::NaiveDate;
use serde::Serialize;

/// Persisted date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TvlRecord {
    pub date: NaiveDate,
    pub tvl: f64,
    pub asset_type: String,
}

impl TvlRecord {
    pub fn new(date: NaiveDate, tvl: f64, asset_type: impl Into<String>) -> Self {
        Self {
            date,
            tvl,
            asset_type: asset_type.into(),
        }
    }
}

/// Normalize a date string to a calendar date.
///
/// Accepts both `2025-01-02` and full timestamps such as
/// `2025-01-02T00:00:00Z` or `2025-01-02 00:00:00.000 UTC`: only the first
/// 10 characters are parsed.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(head, DATE_FORMAT).ok()
}

/// TVL values must be finite and non-negative.
pub fn is_valid_tvl(tvl: f64) -> bool {
    tvl.is_finite() && tvl >= 0.0
}
