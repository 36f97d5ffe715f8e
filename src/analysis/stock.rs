//! Ageing building stock.
//!
//! Only the reference assessment year is read. Each region's age buckets are
//! summed into a total, the four oldest into an old-stock count, and the
//! region qualifies when old buildings make up at least half of the stock.

use super::pivot::pivot_by;
use super::trend::{parse_value, round2};
use super::{OLD_BUILDING_BUCKETS, STOCK_METRIC_PREFIX, STOCK_REFERENCE_YEAR};
use crate::models::{
    Category, CategoryResult, RawRecord, RegionAnalysis, RegionRow, RegionSeries, StockAnalysis,
};
use tracing::debug;

/// Old building ratio at or above which a region qualifies.
pub const AGED_RATIO_THRESHOLD: f64 = 50.0;

/// Run the building stock analysis over every parsed record.
pub fn analyze(records: &[RawRecord]) -> CategoryResult {
    let pivot = pivot_by(
        records.iter().filter(|record| {
            record.year == STOCK_REFERENCE_YEAR
                && record.metric_code.starts_with(STOCK_METRIC_PREFIX)
        }),
        |record| record.metric_code.as_str(),
    );
    debug!(
        "Buildings: {} regions, {} age buckets in {}",
        pivot.series.len(),
        pivot.columns.len(),
        STOCK_REFERENCE_YEAR
    );

    let years = if pivot.series.is_empty() {
        Vec::new()
    } else {
        vec![STOCK_REFERENCE_YEAR.to_string()]
    };

    let mut rows: Vec<RegionRow> = pivot
        .series
        .into_iter()
        .map(|series| RegionRow {
            analysis: RegionAnalysis::Stock(analyze_buckets(&series)),
            series,
        })
        .collect();
    rows.sort_by(|a, b| a.region_code().cmp(b.region_code()));

    CategoryResult {
        category: Category::PhysicalStock,
        years,
        rows,
    }
}

/// Sum a region's buckets into totals and the old building ratio.
pub fn analyze_buckets(series: &RegionSeries) -> StockAnalysis {
    let mut total = 0.0;
    let mut old = 0.0;

    for (code, raw) in &series.values {
        let count = parse_value(raw).unwrap_or(0.0);
        total += count;
        if OLD_BUILDING_BUCKETS.contains(&code.as_str()) {
            old += count;
        }
    }

    let old_ratio = if total > 0.0 {
        old * 100.0 / total
    } else {
        0.0
    };

    StockAnalysis {
        total,
        old,
        old_ratio: round2(old_ratio),
        aged: old_ratio >= AGED_RATIO_THRESHOLD,
    }
}
