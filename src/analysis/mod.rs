//! Category analyzers and the cross-category summary.
//!
//! The statistic codes and thresholds below are fixed by the decline
//! criteria and are not configurable. The only tunable knob is the minimum
//! run of consecutive drops, carried by [`Criteria`].

pub mod demographic;
pub mod economic;
pub mod pivot;
pub mod stock;
pub mod summary;
pub mod trend;

pub use pivot::{pivot_by, pivot_by_year, Pivot};
pub use summary::{criteria_by_region, merge, merge_cached, CriteriaCounts};

use crate::models::{Category, CategoryResult, RawRecord};

/// Total population.
pub const POPULATION_METRIC: &str = "to_in_001";
/// Number of business establishments.
pub const BUSINESS_METRIC: &str = "cp_bnu_001";
/// Family of building counts by construction period, newest bucket first.
pub const STOCK_METRIC_PREFIX: &str = "ho_yr_";
/// The four oldest construction-period buckets.
pub const OLD_BUILDING_BUCKETS: [&str; 4] = ["ho_yr_007", "ho_yr_008", "ho_yr_009", "ho_yr_010"];
/// Assessment year read by the building stock analysis.
pub const STOCK_REFERENCE_YEAR: &str = "2023";
/// Default minimum number of consecutive drops for a sustained decline.
pub const DEFAULT_MIN_CONSECUTIVE_DROPS: usize = 2;

/// Tunable part of the decline criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Criteria {
    /// Consecutive year-over-year drops needed for a sustained decline.
    pub min_consecutive_drops: usize,
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            min_consecutive_drops: DEFAULT_MIN_CONSECUTIVE_DROPS,
        }
    }
}

impl From<&crate::config::AnalysisConfig> for Criteria {
    fn from(config: &crate::config::AnalysisConfig) -> Self {
        Self {
            min_consecutive_drops: config.min_consecutive_drops,
        }
    }
}

/// Run the analyzer matching `category`.
pub fn analyze(category: Category, records: &[RawRecord], criteria: &Criteria) -> CategoryResult {
    match category {
        Category::Demographic => demographic::analyze(records, criteria),
        Category::Economic => economic::analyze(records, criteria),
        Category::PhysicalStock => stock::analyze(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::parse_records;

    #[test]
    fn test_dispatch_filters_by_category() {
        let records = parse_records(
            "2020^A^to_in_001^10\n2020^B^cp_bnu_001^10\n2023^C^ho_yr_010^10\n",
        );
        let criteria = Criteria::default();

        let population = analyze(Category::Demographic, &records, &criteria);
        let business = analyze(Category::Economic, &records, &criteria);
        let buildings = analyze(Category::PhysicalStock, &records, &criteria);

        assert_eq!(population.category, Category::Demographic);
        assert_eq!(population.rows[0].region_code(), "A");
        assert_eq!(business.rows[0].region_code(), "B");
        assert_eq!(buildings.rows[0].region_code(), "C");
        assert!(buildings.rows[0].meets());
    }
}
