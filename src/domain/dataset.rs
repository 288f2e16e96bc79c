//! In-memory TVL table.

use super::record::TvlRecord;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Date-ordered collection of [`TvlRecord`]s owned by a single run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<TvlRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dataset, stably sorting the records by date.
    pub fn from_records(mut records: Vec<TvlRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        Self { records }
    }

    pub fn records(&self) -> &[TvlRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.date).max()
    }

    /// Concatenates `rows` onto the table. No deduplication happens here.
    pub fn append(mut self, rows: Vec<TvlRecord>) -> Self {
        self.records.extend(rows);
        self
    }

    /// Distinct dates in ascending order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records
            .iter()
            .map(|r| r.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn records_on(&self, date: NaiveDate) -> impl Iterator<Item = &TvlRecord> {
        self.records.iter().filter(move |r| r.date == date)
    }
}
