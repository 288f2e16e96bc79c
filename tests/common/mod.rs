#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tvltracker::adapters::csv_store::CsvStore;
use tvltracker::domain::error::TvlError;
use tvltracker::ports::fetch_port::{FetchPort, FetchResponse};

pub const HEADER: &str = "date,tvl,asset_type\n";

/// Fetch port returning a canned response and recording requested URLs.
pub struct MockFetchPort {
    pub status: u16,
    pub body: String,
    pub calls: RefCell<Vec<String>>,
}

impl MockFetchPort {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl FetchPort for MockFetchPort {
    fn fetch(&self, url: &str) -> Result<FetchResponse, TvlError> {
        self.calls.borrow_mut().push(url.to_string());
        Ok(FetchResponse {
            status: self.status,
            body: self.body.as_bytes().to_vec(),
        })
    }
}

/// Builds a `{ "result": { "rows": [...] } }` body from `(date, tvl, asset_type)`.
pub fn rows_body(rows: &[(&str, f64, &str)]) -> String {
    let rows: Vec<serde_json::Value> = rows
        .iter()
        .map(|(date, tvl, asset_type)| {
            serde_json::json!({ "date": date, "tvl": tvl, "asset_type": asset_type })
        })
        .collect();
    serde_json::json!({ "execution_id": "01TEST", "result": { "rows": rows } }).to_string()
}

/// A temp directory holding `tvl_data.csv`, optionally pre-seeded.
pub fn temp_store(initial: Option<&str>) -> (TempDir, PathBuf, CsvStore) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tvl_data.csv");
    if let Some(content) = initial {
        fs::write(&path, content).unwrap();
    }
    let store = CsvStore::new(&path);
    (dir, path, store)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn read(path: &PathBuf) -> String {
    fs::read_to_string(path).unwrap()
}
