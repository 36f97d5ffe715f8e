//! Population decline.
//!
//! A region is in decline when its population fell at least 20% from its
//! all-time peak, or when it dropped in consecutive years recently.

use super::trend::{analyze_series, TrendRule};
use super::{pivot::pivot_by_year, Criteria, POPULATION_METRIC};
use crate::models::{Category, CategoryResult, RawRecord, RegionAnalysis, RegionRow};
use tracing::debug;

pub const RULE: TrendRule = TrendRule {
    peak_window: None,
    sharp_threshold: -20.0,
    require_distinct_peak: false,
};

/// Run the population analysis over every parsed record.
pub fn analyze(records: &[RawRecord], criteria: &Criteria) -> CategoryResult {
    let pivot = pivot_by_year(
        records
            .iter()
            .filter(|record| record.metric_code == POPULATION_METRIC),
    );
    debug!(
        "Population: {} regions over {} years",
        pivot.series.len(),
        pivot.columns.len()
    );

    let mut rows: Vec<RegionRow> = pivot
        .series
        .into_iter()
        .map(|series| {
            let trend =
                analyze_series(&series, &pivot.columns, &RULE, criteria.min_consecutive_drops);
            RegionRow {
                series,
                analysis: RegionAnalysis::Trend(trend),
            }
        })
        .collect();
    rows.sort_by(|a, b| a.region_code().cmp(b.region_code()));

    CategoryResult {
        category: Category::Demographic,
        years: pivot.columns,
        rows,
    }
}
