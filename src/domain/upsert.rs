//! Daily upsert controller.
//!
//! One pass per invocation: skip if today's figures are already stored,
//! otherwise fetch once, keep only rows dated today, append and persist.
//! Every non-`Updated` outcome leaves the store untouched.

use crate::domain::error::TvlError;
use crate::domain::response::{parse_rows, rows_for_day};
use crate::ports::dataset_port::DatasetPort;
use crate::ports::fetch_port::FetchPort;
use chrono::NaiveDate;
use std::fmt;
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    /// The store already holds data for today (or later).
    Skipped { latest: NaiveDate },
    Updated { date: NaiveDate, count: usize },
    /// Upstream has not published today's figures yet.
    NoDataForToday { date: NaiveDate },
    FetchFailed { status: u16 },
    MalformedResponse { reason: String },
}

impl UpsertOutcome {
    /// Process exit status: 0 unless the run failed.
    pub fn exit_status(&self) -> u8 {
        match self {
            UpsertOutcome::FetchFailed { .. } => 3,
            UpsertOutcome::MalformedResponse { .. } => 4,
            _ => 0,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

impl fmt::Display for UpsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertOutcome::Skipped { latest } => {
                write!(f, "skipped: data already recorded through {latest}")
            }
            UpsertOutcome::Updated { date, count } => {
                write!(f, "updated: {count} rows for {date}")
            }
            UpsertOutcome::NoDataForToday { date } => {
                write!(f, "no data for today ({date}) yet")
            }
            UpsertOutcome::FetchFailed { status } => write!(f, "fetch failed: HTTP {status}"),
            UpsertOutcome::MalformedResponse { reason } => {
                write!(f, "malformed response: {reason}")
            }
        }
    }
}

/// Runs one daily pass against `store`.
///
/// `today` is supplied by the caller; the CLI passes the current UTC date.
/// Transport and I/O failures are returned as errors and, like the failure
/// outcomes, never touch the store.
pub fn run_daily_upsert(
    store: &dyn DatasetPort,
    fetcher: &dyn FetchPort,
    url: &str,
    today: NaiveDate,
) -> Result<UpsertOutcome, TvlError> {
    let dataset = store.load()?;

    if let Some(latest) = dataset.latest_date() {
        if latest >= today {
            info!(%latest, %today, "today's data already recorded");
            return Ok(UpsertOutcome::Skipped { latest });
        }
    }

    info!(%today, rows = dataset.len(), "fetching today's TVL");
    let response = fetcher.fetch(url)?;
    if !response.is_success() {
        warn!(status = response.status, "fetch returned non-success status");
        return Ok(UpsertOutcome::FetchFailed {
            status: response.status,
        });
    }

    let parsed = match parse_rows(&response.body) {
        Ok(p) => p,
        Err(e) => {
            warn!(reason = %e, "response did not match expected schema");
            return Ok(UpsertOutcome::MalformedResponse { reason: e.reason });
        }
    };
    if parsed.dropped > 0 {
        warn!(dropped = parsed.dropped, "response rows dropped for unparseable dates");
    }

    let fresh = match rows_for_day(parsed.rows, today) {
        Ok(rows) => rows,
        Err(e) => {
            warn!(reason = %e, "today's rows failed validation");
            return Ok(UpsertOutcome::MalformedResponse { reason: e.reason });
        }
    };
    if fresh.is_empty() {
        info!(%today, "response has no rows for today");
        return Ok(UpsertOutcome::NoDataForToday { date: today });
    }

    let count = fresh.len();
    let dataset = dataset.append(fresh);
    store.persist(&dataset)?;
    info!(%today, count, total = dataset.len(), "appended today's rows");

    Ok(UpsertOutcome::Updated { date: today, count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::Dataset;
    use crate::domain::record::TvlRecord;
    use crate::ports::fetch_port::FetchResponse;
    use std::cell::{Cell, RefCell};

    struct MemoryStore {
        dataset: RefCell<Dataset>,
        persists: Cell<usize>,
    }

    impl MemoryStore {
        fn new(records: Vec<TvlRecord>) -> Self {
            Self {
                dataset: RefCell::new(Dataset::from_records(records)),
                persists: Cell::new(0),
            }
        }
    }

    impl DatasetPort for MemoryStore {
        fn load(&self) -> Result<Dataset, TvlError> {
            Ok(self.dataset.borrow().clone())
        }

        fn persist(&self, dataset: &Dataset) -> Result<(), TvlError> {
            *self.dataset.borrow_mut() = dataset.clone();
            self.persists.set(self.persists.get() + 1);
            Ok(())
        }
    }

    struct StaticFetch {
        status: u16,
        body: &'static str,
        calls: Cell<usize>,
    }

    impl StaticFetch {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                calls: Cell::new(0),
            }
        }
    }

    impl FetchPort for StaticFetch {
        fn fetch(&self, _url: &str) -> Result<FetchResponse, TvlError> {
            self.calls.set(self.calls.get() + 1);
            Ok(FetchResponse {
                status: self.status,
                body: self.body.as_bytes().to_vec(),
            })
        }
    }

    struct DownFetch;

    impl FetchPort for DownFetch {
        fn fetch(&self, _url: &str) -> Result<FetchResponse, TvlError> {
            Err(TvlError::Transport {
                reason: "connection refused".into(),
            })
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const TWO_DAYS: &str = r#"{"result":{"rows":[
        {"date":"2025-01-01 00:00:00.000 UTC","tvl":10,"asset_type":"ITS"},
        {"date":"2025-01-02 00:00:00.000 UTC","tvl":20,"asset_type":"ITS"},
        {"date":"2025-01-02 00:00:00.000 UTC","tvl":5,"asset_type":"non-ITS"}
    ]}}"#;

    #[test]
    fn skips_without_fetching_when_today_present() {
        let store = MemoryStore::new(vec![TvlRecord::new(date(2025, 1, 2), 1.0, "ITS")]);
        let fetch = StaticFetch::new(200, TWO_DAYS);
        let outcome = run_daily_upsert(&store, &fetch, "u", date(2025, 1, 2)).unwrap();
        assert_eq!(outcome, UpsertOutcome::Skipped { latest: date(2025, 1, 2) });
        assert_eq!(fetch.calls.get(), 0);
        assert_eq!(store.persists.get(), 0);
    }

    #[test]
    fn future_dated_store_is_skipped() {
        let store = MemoryStore::new(vec![TvlRecord::new(date(2025, 1, 9), 1.0, "ITS")]);
        let fetch = StaticFetch::new(200, TWO_DAYS);
        let outcome = run_daily_upsert(&store, &fetch, "u", date(2025, 1, 2)).unwrap();
        assert!(matches!(outcome, UpsertOutcome::Skipped { .. }));
        assert_eq!(fetch.calls.get(), 0);
    }

    #[test]
    fn appends_only_today_rows() {
        let store = MemoryStore::new(vec![TvlRecord::new(date(2024, 12, 31), 1.0, "ITS")]);
        let fetch = StaticFetch::new(200, TWO_DAYS);
        let outcome = run_daily_upsert(&store, &fetch, "u", date(2025, 1, 2)).unwrap();
        assert_eq!(
            outcome,
            UpsertOutcome::Updated {
                date: date(2025, 1, 2),
                count: 2
            }
        );
        let ds = store.dataset.borrow();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records_on(date(2025, 1, 1)).count(), 0);
        assert_eq!(store.persists.get(), 1);
    }

    #[test]
    fn non_success_status_is_fetch_failed() {
        let store = MemoryStore::new(vec![]);
        let fetch = StaticFetch::new(503, "");
        let outcome = run_daily_upsert(&store, &fetch, "u", date(2025, 1, 2)).unwrap();
        assert_eq!(outcome, UpsertOutcome::FetchFailed { status: 503 });
        assert_eq!(outcome.exit_status(), 3);
        assert_eq!(store.persists.get(), 0);
    }

    #[test]
    fn unexpected_body_is_malformed() {
        let store = MemoryStore::new(vec![]);
        let fetch = StaticFetch::new(200, r#"{"unexpected": true}"#);
        let outcome = run_daily_upsert(&store, &fetch, "u", date(2025, 1, 2)).unwrap();
        assert!(matches!(outcome, UpsertOutcome::MalformedResponse { .. }));
        assert_eq!(store.persists.get(), 0);
    }

    #[test]
    fn bad_historical_tvl_does_not_block_today() {
        let store = MemoryStore::new(vec![]);
        let fetch = StaticFetch::new(
            200,
            r#"{"result":{"rows":[
                {"date":"2024-12-01","tvl":-1,"asset_type":"ITS"},
                {"date":"2025-01-02","tvl":7,"asset_type":"ITS"}
            ]}}"#,
        );
        let outcome = run_daily_upsert(&store, &fetch, "u", date(2025, 1, 2)).unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated { date: date(2025, 1, 2), count: 1 });
        assert_eq!(store.persists.get(), 1);
    }

    #[test]
    fn bad_tvl_today_is_malformed() {
        let store = MemoryStore::new(vec![]);
        let fetch = StaticFetch::new(
            200,
            r#"{"result":{"rows":[
                {"date":"2025-01-02","tvl":7,"asset_type":"ITS"},
                {"date":"2025-01-02","tvl":-2,"asset_type":"non-ITS"}
            ]}}"#,
        );
        let outcome = run_daily_upsert(&store, &fetch, "u", date(2025, 1, 2)).unwrap();
        assert!(matches!(outcome, UpsertOutcome::MalformedResponse { .. }));
        assert_eq!(store.persists.get(), 0);
    }

    #[test]
    fn no_rows_for_today() {
        let store = MemoryStore::new(vec![]);
        let fetch = StaticFetch::new(200, TWO_DAYS);
        let outcome = run_daily_upsert(&store, &fetch, "u", date(2025, 1, 3)).unwrap();
        assert_eq!(outcome, UpsertOutcome::NoDataForToday { date: date(2025, 1, 3) });
        assert_eq!(outcome.exit_status(), 0);
        assert_eq!(store.persists.get(), 0);
    }

    #[test]
    fn transport_error_propagates_without_persist() {
        let store = MemoryStore::new(vec![]);
        let err = run_daily_upsert(&store, &DownFetch, "u", date(2025, 1, 2)).unwrap_err();
        assert!(matches!(err, TvlError::Transport { .. }));
        assert_eq!(store.persists.get(), 0);
    }

    #[test]
    fn outcome_messages() {
        assert_eq!(
            UpsertOutcome::Updated { date: date(2025, 1, 2), count: 2 }.to_string(),
            "updated: 2 rows for 2025-01-02"
        );
        assert_eq!(
            UpsertOutcome::FetchFailed { status: 503 }.to_string(),
            "fetch failed: HTTP 503"
        );
    }

    #[test]
    fn exit_statuses() {
        assert_eq!(UpsertOutcome::FetchFailed { status: 500 }.exit_status(), 3);
        assert_eq!(
            UpsertOutcome::MalformedResponse { reason: "x".into() }.exit_status(),
            4
        );
        assert_eq!(
            UpsertOutcome::NoDataForToday { date: date(2025, 1, 2) }.exit_status(),
            0
        );
        assert_eq!(UpsertOutcome::Skipped { latest: date(2025, 1, 2) }.exit_status(), 0);
    }
}
