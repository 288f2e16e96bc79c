//! Derived TVL figures: daily totals, category shares, monthly statistics and
//! the latest-day breakdown with its day-over-day change.
//!
//! All functions are read-only over a [`Dataset`].

use super::dataset::Dataset;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub tvl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyShare {
    pub date: NaiveDate,
    pub asset_type: String,
    pub tvl: f64,
    /// Fraction of the day's total, in `[0, 1]`.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStat {
    /// First day of the month.
    pub month: NaiveDate,
    pub asset_type: String,
    pub max: f64,
    pub mean: f64,
    pub min: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetTvl {
    pub asset_type: String,
    pub tvl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestBreakdown {
    pub date: NaiveDate,
    pub by_asset: Vec<AssetTvl>,
    pub total: f64,
    pub previous_date: Option<NaiveDate>,
    pub previous_total: Option<f64>,
    /// Percent change of `total` against `previous_total`.
    pub pct_change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub rows: usize,
    pub first_date: Option<NaiveDate>,
    pub latest: Option<LatestBreakdown>,
    pub daily_totals: Vec<DailyTotal>,
    pub daily_shares: Vec<DailyShare>,
    pub monthly_stats: Vec<MonthlyStat>,
}

impl Summary {
    pub fn compute(dataset: &Dataset) -> Self {
        Self {
            rows: dataset.len(),
            first_date: dataset.dates().first().copied(),
            latest: latest_breakdown(dataset),
            daily_totals: daily_totals(dataset),
            daily_shares: daily_shares(dataset),
            monthly_stats: monthly_stats(dataset),
        }
    }
}

fn grouped_by_day(dataset: &Dataset) -> BTreeMap<NaiveDate, BTreeMap<&str, f64>> {
    let mut days: BTreeMap<NaiveDate, BTreeMap<&str, f64>> = BTreeMap::new();
    for r in dataset.records() {
        *days
            .entry(r.date)
            .or_default()
            .entry(r.asset_type.as_str())
            .or_default() += r.tvl;
    }
    days
}

pub fn daily_totals(dataset: &Dataset) -> Vec<DailyTotal> {
    grouped_by_day(dataset)
        .into_iter()
        .map(|(date, assets)| DailyTotal {
            date,
            tvl: assets.values().sum(),
        })
        .collect()
}

pub fn daily_shares(dataset: &Dataset) -> Vec<DailyShare> {
    let mut out = Vec::new();
    for (date, assets) in grouped_by_day(dataset) {
        let total: f64 = assets.values().sum();
        for (asset_type, tvl) in assets {
            let share = if total > 0.0 { tvl / total } else { 0.0 };
            out.push(DailyShare {
                date,
                asset_type: asset_type.to_string(),
                tvl,
                share,
            });
        }
    }
    out
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn monthly_stats(dataset: &Dataset) -> Vec<MonthlyStat> {
    let mut buckets: BTreeMap<(NaiveDate, &str), Vec<f64>> = BTreeMap::new();
    for r in dataset.records() {
        buckets
            .entry((month_start(r.date), r.asset_type.as_str()))
            .or_default()
            .push(r.tvl);
    }

    buckets
        .into_iter()
        .map(|((month, asset_type), values)| {
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            MonthlyStat {
                month,
                asset_type: asset_type.to_string(),
                max,
                mean,
                min,
            }
        })
        .collect()
}

fn day_total(dataset: &Dataset, date: NaiveDate) -> f64 {
    dataset.records_on(date).map(|r| r.tvl).sum()
}

pub fn latest_breakdown(dataset: &Dataset) -> Option<LatestBreakdown> {
    let dates = dataset.dates();
    let (&date, earlier) = dates.split_last()?;

    let mut assets: BTreeMap<&str, f64> = BTreeMap::new();
    for r in dataset.records_on(date) {
        *assets.entry(r.asset_type.as_str()).or_default() += r.tvl;
    }
    let by_asset: Vec<AssetTvl> = assets
        .into_iter()
        .map(|(asset_type, tvl)| AssetTvl {
            asset_type: asset_type.to_string(),
            tvl,
        })
        .collect();
    let total = day_total(dataset, date);

    let previous = earlier.last().map(|&d| (d, day_total(dataset, d)));
    let pct_change = previous.and_then(|(_, prev)| {
        if prev > 0.0 {
            Some((total - prev) / prev * 100.0)
        } else {
            None
        }
    });

    Some(LatestBreakdown {
        date,
        by_asset,
        total,
        previous_date: previous.map(|(d, _)| d),
        previous_total: previous.map(|(_, t)| t),
        pct_change,
    })
}
