//! Business establishment decline.
//!
//! Same shape as the population analysis, with a peak taken from the last
//! ten years with data and a 5% threshold.

use super::trend::{analyze_series, TrendRule};
use super::{pivot::pivot_by_year, Criteria, BUSINESS_METRIC};
use crate::models::{Category, CategoryResult, RawRecord, RegionAnalysis, RegionRow};
use tracing::debug;

/// Number of most recent years with data searched for the peak.
pub const PEAK_WINDOW: usize = 10;

pub const RULE: TrendRule = TrendRule {
    peak_window: Some(PEAK_WINDOW),
    sharp_threshold: -5.0,
    require_distinct_peak: true,
};

/// Run the business analysis over every parsed record.
pub fn analyze(records: &[RawRecord], criteria: &Criteria) -> CategoryResult {
    let pivot = pivot_by_year(
        records
            .iter()
            .filter(|record| record.metric_code == BUSINESS_METRIC),
    );
    debug!(
        "Business: {} regions over {} years",
        pivot.series.len(),
        pivot.columns.len()
    );

    let mut rows: Vec<RegionRow> = pivot
        .series
        .into_iter()
        .map(|series| RegionRow {
            analysis: RegionAnalysis::Trend(analyze_series(
                &series,
                &pivot.columns,
                &RULE,
                criteria.min_consecutive_drops,
            )),
            series,
        })
        .collect();
    rows.sort_by(|a, b| a.region_code().cmp(b.region_code()));

    CategoryResult {
        category: Category::Economic,
        years: pivot.columns,
        rows,
    }
}
