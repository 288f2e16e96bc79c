//! Analytics API response validation and shaping.
//!
//! The endpoint returns `{ "result": { "rows": [ { "date", "tvl", "asset_type" } ] } }`.
//! Anything else is reported as [`MalformedResponse`].

use super::record::{is_valid_tvl, parse_calendar_date, TvlRecord};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{reason}")]
pub struct MalformedResponse {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
struct QueryResults {
    result: QueryResult,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    rows: Vec<RawRow>,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    date: String,
    tvl: f64,
    asset_type: String,
}

/// Date-normalized rows decoded from a response body.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRows {
    pub rows: Vec<TvlRecord>,
    pub dropped: usize,
}

/// Decodes the body into records. Rows with an unparseable date are dropped
/// and counted; structural problems fail the whole response.
pub fn parse_rows(body: &[u8]) -> Result<ResponseRows, MalformedResponse> {
    let parsed: QueryResults = serde_json::from_slice(body).map_err(|e| MalformedResponse {
        reason: e.to_string(),
    })?;

    let mut rows = Vec::with_capacity(parsed.result.rows.len());
    let mut dropped = 0usize;

    for (idx, raw) in parsed.result.rows.into_iter().enumerate() {
        match parse_calendar_date(&raw.date) {
            Some(date) => rows.push(TvlRecord::new(date, raw.tvl, raw.asset_type)),
            None => {
                warn!(row = idx, date = %raw.date, "dropping response row with unparseable date");
                dropped += 1;
            }
        }
    }

    Ok(ResponseRows { rows, dropped })
}

/// Keeps only rows dated `today`, collapsing repeated asset types
/// (first occurrence wins).
///
/// Only the kept rows are checked for a valid tvl; a bad figure on some
/// historical day does not block today's update.
pub fn rows_for_day(
    rows: Vec<TvlRecord>,
    today: NaiveDate,
) -> Result<Vec<TvlRecord>, MalformedResponse> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for r in rows.into_iter().filter(|r| r.date == today) {
        if !is_valid_tvl(r.tvl) {
            return Err(MalformedResponse {
                reason: format!(
                    "{} row for {today}: tvl must be non-negative, got {}",
                    r.asset_type, r.tvl
                ),
            });
        }
        if !seen.insert(r.asset_type.clone()) {
            warn!(asset_type = %r.asset_type, %today, "ignoring repeated asset type in response");
            continue;
        }
        out.push(r);
    }
    Ok(out)
}
