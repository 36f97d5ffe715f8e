//! Pivoting flat observations into one row per region.

use crate::models::{RawRecord, RegionSeries};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Regions in first-seen order plus the sorted set of columns observed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pivot {
    pub series: Vec<RegionSeries>,
    /// Distinct column keys across all regions, ascending.
    pub columns: Vec<String>,
}

/// Spread records across a year axis.
pub fn pivot_by_year<'a, I>(records: I) -> Pivot
where
    I: IntoIterator<Item = &'a RawRecord>,
{
    pivot_by(records, |record| record.year.as_str())
}

/// Group records by region and spread them across the column chosen by `column`.
///
/// A repeated (region, column) pair overwrites the earlier value. Columns are
/// collected from every record with a key, even one without a region code;
/// such records add no values.
pub fn pivot_by<'a, I, F>(records: I, column: F) -> Pivot
where
    I: IntoIterator<Item = &'a RawRecord>,
    F: Fn(&'a RawRecord) -> &'a str,
{
    let mut series: Vec<RegionSeries> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut columns: BTreeSet<&str> = BTreeSet::new();
    let mut overwritten = 0usize;
    let mut dropped = 0usize;

    for record in records {
        let key = column(record);
        if key.is_empty() {
            dropped += 1;
            continue;
        }
        columns.insert(key);
        if record.region_code.is_empty() {
            dropped += 1;
            continue;
        }

        let slot = *index.entry(record.region_code.as_str()).or_insert_with(|| {
            series.push(RegionSeries::new(record.region_code.clone()));
            series.len() - 1
        });

        if series[slot]
            .values
            .insert(key.to_string(), record.value.clone())
            .is_some()
        {
            overwritten += 1;
        }
    }

    if overwritten > 0 || dropped > 0 {
        debug!(
            "Pivot: {} values overwritten by later records, {} records without region/column",
            overwritten, dropped
        );
    }

    Pivot {
        series,
        columns: columns.into_iter().map(String::from).collect(),
    }
}
