//! Cross-category merge.
//!
//! Combines the three category results into one row per region, counting
//! how many categories each region meets and ranking regions by that count.

use crate::cache::ProcessedDataCache;
use crate::error::PipelineError;
use crate::models::{Category, CategoryResult, SummaryRow};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Merge the three category results.
///
/// Every region seen in any category gets a row; categories a region is
/// absent from count as not met with a zero supporting value. Rows are
/// ordered by criteria met, highest first. Ties keep first-seen order:
/// population regions, then new business regions, then new building regions.
pub fn merge(
    demographic: &CategoryResult,
    economic: &CategoryResult,
    stock: &CategoryResult,
) -> Vec<SummaryRow> {
    let mut rows: Vec<SummaryRow> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for result in [demographic, economic, stock] {
        for region in &result.rows {
            let slot = *index.entry(region.region_code()).or_insert_with(|| {
                rows.push(empty_row(region.region_code()));
                rows.len() - 1
            });
            let row = &mut rows[slot];
            let met = region.meets();
            let headline = region.headline();

            match result.category {
                Category::Demographic => {
                    row.population_decline = met;
                    row.population_rate = headline;
                }
                Category::Economic => {
                    row.business_decline = met;
                    row.business_rate = headline;
                }
                Category::PhysicalStock => {
                    row.aged_buildings = met;
                    row.old_building_ratio = headline;
                }
            }
        }
    }

    for row in &mut rows {
        row.criteria_met = Category::ALL
            .into_iter()
            .filter(|category| row.verdict(*category))
            .count() as u8;
    }

    // Stable: ties stay in insertion order.
    rows.sort_by_key(|row| std::cmp::Reverse(row.criteria_met));
    rows
}

/// Merge straight from the cache; fails unless all three categories are present.
pub fn merge_cached(cache: &ProcessedDataCache) -> Result<Vec<SummaryRow>, PipelineError> {
    let (demographic, economic, stock) = cache.require_all()?;
    Ok(merge(demographic, economic, stock))
}

fn empty_row(region_code: &str) -> SummaryRow {
    SummaryRow {
        region_code: region_code.to_string(),
        population_decline: false,
        population_rate: 0.0,
        business_decline: false,
        business_rate: 0.0,
        aged_buildings: false,
        old_building_ratio: 0.0,
        criteria_met: 0,
    }
}

/// Region code to number of criteria met, as consumed by map renderers.
pub fn criteria_by_region(rows: &[SummaryRow]) -> BTreeMap<String, u8> {
    rows.iter()
        .map(|row| (row.region_code.clone(), row.criteria_met))
        .collect()
}

/// How many regions meet 0, 1, 2 and 3 criteria.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CriteriaCounts {
    pub none: usize,
    pub one: usize,
    pub two: usize,
    pub three: usize,
}

impl CriteriaCounts {
    pub fn from_rows(rows: &[SummaryRow]) -> Self {
        let mut counts = Self::default();
        for row in rows {
            match row.criteria_met {
                0 => counts.none += 1,
                1 => counts.one += 1,
                2 => counts.two += 1,
                _ => counts.three += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.none + self.one + self.two + self.three
    }
}

impl fmt::Display for CriteriaCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "3 met: {} | 2 met: {} | 1 met: {} | none: {}",
            self.three, self.two, self.one, self.none
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RegionAnalysis, RegionRow, RegionSeries, StockAnalysis, TrendAnalysis};

    fn trend_row(region: &str, met: bool, rate: f64) -> RegionRow {
        RegionRow {
            series: RegionSeries::new(region),
            analysis: RegionAnalysis::Trend(TrendAnalysis {
                decline_rate: rate,
                sharp_decline: met,
                ..TrendAnalysis::default()
            }),
        }
    }

    fn stock_row(region: &str, ratio: f64) -> RegionRow {
        RegionRow {
            series: RegionSeries::new(region),
            analysis: RegionAnalysis::Stock(StockAnalysis {
                total: 100.0,
                old: ratio,
                old_ratio: ratio,
                aged: ratio >= 50.0,
            }),
        }
    }

    fn result(category: Category, rows: Vec<RegionRow>) -> CategoryResult {
        CategoryResult {
            category,
            years: Vec::new(),
            rows,
        }
    }

    fn fixture() -> (CategoryResult, CategoryResult, CategoryResult) {
        (
            result(
                Category::Demographic,
                vec![trend_row("A", false, -3.0), trend_row("B", true, -25.0)],
            ),
            result(
                Category::Economic,
                vec![trend_row("B", true, -8.0), trend_row("C", true, -6.0)],
            ),
            result(
                Category::PhysicalStock,
                vec![stock_row("D", 10.0), stock_row("B", 70.0), stock_row("C", 55.0)],
            ),
        )
    }

    #[test]
    fn test_merge_is_union_of_regions() {
        let (d, e, s) = fixture();
        let rows = merge(&d, &e, &s);

        let mut codes: Vec<_> = rows.iter().map(|r| r.region_code.as_str()).collect();
        codes.sort();
        assert_eq!(codes, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_merge_ranks_by_criteria_met() {
        let (d, e, s) = fixture();
        let rows = merge(&d, &e, &s);

        let ranked: Vec<_> = rows
            .iter()
            .map(|r| (r.region_code.as_str(), r.criteria_met))
            .collect();
        // A and D tie at zero and keep first-seen order.
        assert_eq!(ranked, vec![("B", 3), ("C", 2), ("A", 0), ("D", 0)]);
    }

    #[test]
    fn test_missing_categories_default_to_not_met() {
        let (d, e, s) = fixture();
        let rows = merge(&d, &e, &s);
        let c = rows.iter().find(|r| r.region_code == "C").unwrap();

        assert!(!c.population_decline);
        assert_eq!(c.population_rate, 0.0);
        assert!(c.business_decline);
        assert_eq!(c.business_rate, -6.0);
        assert!(c.aged_buildings);
        assert_eq!(c.old_building_ratio, 55.0);
    }

    #[test]
    fn test_criteria_met_matches_flags() {
        let (d, e, s) = fixture();
        for row in merge(&d, &e, &s) {
            let flags = Category::ALL
                .into_iter()
                .filter(|c| row.verdict(*c))
                .count();
            assert!(row.criteria_met <= 3);
            assert_eq!(row.criteria_met as usize, flags);
        }
    }

    #[test]
    fn test_merge_cached_requires_all_categories() {
        let (d, e, _) = fixture();
        let mut cache = ProcessedDataCache::new();
        cache.store(d);
        cache.store(e);

        let err = merge_cached(&cache).unwrap_err();
        assert!(err.to_string().contains("Buildings"));
    }

    #[test]
    fn test_criteria_by_region_and_counts() {
        let (d, e, s) = fixture();
        let rows = merge(&d, &e, &s);

        let map = criteria_by_region(&rows);
        assert_eq!(map.get("B"), Some(&3));
        assert_eq!(map.get("D"), Some(&0));

        let counts = CriteriaCounts::from_rows(&rows);
        assert_eq!(counts.three, 1);
        assert_eq!(counts.two, 1);
        assert_eq!(counts.none, 2);
        assert_eq!(counts.total(), 4);
    }
}
