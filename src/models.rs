//! Data models for the decline indicator pipeline.
//!
//! This module contains the core data structures shared by the parser,
//! the category analyzers, the summary merger and the export serializer.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// One observation parsed from a single line of an input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Four-digit observation year.
    pub year: String,
    /// Identifier of the geographic sub-unit.
    pub region_code: String,
    /// Statistic identifier (population, business count, building age bucket...).
    pub metric_code: String,
    /// Raw value as it appeared in the file.
    pub value: String,
}

/// One of the three independent decline dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Population decline.
    Demographic,
    /// Business establishment decline.
    Economic,
    /// Ageing building stock.
    PhysicalStock,
}

impl Category {
    /// All categories in merge order.
    pub const ALL: [Category; 3] = [
        Category::Demographic,
        Category::Economic,
        Category::PhysicalStock,
    ];

    /// Short machine name, used for file names and selectors.
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Demographic => "population",
            Category::Economic => "business",
            Category::PhysicalStock => "buildings",
        }
    }

    /// Prefix used for this category's columns inside the summary view.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Demographic => "Population",
            Category::Economic => "Business",
            Category::PhysicalStock => "Buildings",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// What a pipeline invocation works on: one category, or the cross-category summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Selector {
    Category(Category),
    Summary,
}

impl Selector {
    pub fn slug(&self) -> &'static str {
        match self {
            Selector::Category(category) => category.slug(),
            Selector::Summary => "summary",
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Category(category) => write!(f, "{}", category),
            Selector::Summary => write!(f, "Summary"),
        }
    }
}

impl From<Category> for Selector {
    fn from(category: Category) -> Self {
        Selector::Category(category)
    }
}

impl FromStr for Selector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "demographic" | "population" => Ok(Selector::Category(Category::Demographic)),
            "economic" | "business" => Ok(Selector::Category(Category::Economic)),
            "physical-stock" | "physical_stock" | "buildings" => {
                Ok(Selector::Category(Category::PhysicalStock))
            }
            "summary" => Ok(Selector::Summary),
            other => Err(format!("Unknown category: {}", other)),
        }
    }
}

/// Two-valued verdict as it appears in exported tables ('O' met, 'X' not met).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Met,
    NotMet,
}

impl Verdict {
    pub fn is_met(&self) -> bool {
        matches!(self, Verdict::Met)
    }
}

impl From<bool> for Verdict {
    fn from(met: bool) -> Self {
        if met {
            Verdict::Met
        } else {
            Verdict::NotMet
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Met => write!(f, "O"),
            Verdict::NotMet => write!(f, "X"),
        }
    }
}

/// Raw content of one supplied file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// File name as supplied by the caller.
    pub name: String,
    /// Decoded text content.
    pub content: String,
}

impl InputFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// One row of a pivoted table: a region and its raw values keyed by column
/// (a year for time series, a bucket code for the building stock).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionSeries {
    pub region_code: String,
    pub values: BTreeMap<String, String>,
}

impl RegionSeries {
    pub fn new(region_code: impl Into<String>) -> Self {
        Self {
            region_code: region_code.into(),
            values: BTreeMap::new(),
        }
    }

    /// Raw value for a column, empty when absent.
    pub fn raw(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }
}

/// Trend-decline findings for one region (demographic and economic categories).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    /// Year holding the peak value, if any year has data.
    pub peak_year: Option<String>,
    /// Most recent year with data.
    pub latest_year: Option<String>,
    /// Years that closed a strictly decreasing step inside the trailing window.
    pub decline_years: BTreeSet<String>,
    /// Percent change from peak to latest, rounded to 2 decimals for reporting.
    pub decline_rate: f64,
    /// Condition A: the unrounded decline rate is at or below the category threshold.
    pub sharp_decline: bool,
    /// Condition B: long enough run of consecutive drops.
    pub sustained_decline: bool,
}

impl TrendAnalysis {
    pub fn meets(&self) -> bool {
        self.sharp_decline || self.sustained_decline
    }
}

/// Building-stock findings for one region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockAnalysis {
    /// Sum of every age bucket.
    pub total: f64,
    /// Sum of the old age buckets.
    pub old: f64,
    /// `old / total * 100`, rounded to 2 decimals; 0 when total is 0.
    pub old_ratio: f64,
    /// The unrounded ratio reaches the aged threshold.
    pub aged: bool,
}

/// Category-specific findings attached to a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RegionAnalysis {
    Trend(TrendAnalysis),
    Stock(StockAnalysis),
}

/// A pivoted region together with its analysis verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRow {
    pub series: RegionSeries,
    pub analysis: RegionAnalysis,
}

impl RegionRow {
    pub fn region_code(&self) -> &str {
        &self.series.region_code
    }

    /// Category verdict for this region.
    pub fn meets(&self) -> bool {
        match &self.analysis {
            RegionAnalysis::Trend(trend) => trend.meets(),
            RegionAnalysis::Stock(stock) => stock.aged,
        }
    }

    /// The headline number supporting the verdict: decline rate for trends,
    /// old building ratio for the stock.
    pub fn headline(&self) -> f64 {
        match &self.analysis {
            RegionAnalysis::Trend(trend) => trend.decline_rate,
            RegionAnalysis::Stock(stock) => stock.old_ratio,
        }
    }
}

/// Output of one category analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: Category,
    /// Distinct years seen in the input, ascending.
    pub years: Vec<String>,
    pub rows: Vec<RegionRow>,
}

impl CategoryResult {
    /// Number of regions meeting this category's criterion.
    pub fn met_count(&self) -> usize {
        self.rows.iter().filter(|row| row.meets()).count()
    }

    pub fn find(&self, region_code: &str) -> Option<&RegionRow> {
        self.rows.iter().find(|row| row.region_code() == region_code)
    }
}

/// One region of the cross-category summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub region_code: String,
    pub population_decline: bool,
    pub population_rate: f64,
    pub business_decline: bool,
    pub business_rate: f64,
    pub aged_buildings: bool,
    pub old_building_ratio: f64,
    /// Number of categories met, 0 to 3.
    pub criteria_met: u8,
}

impl SummaryRow {
    /// Verdict flag for a category.
    pub fn verdict(&self, category: Category) -> bool {
        match category {
            Category::Demographic => self.population_decline,
            Category::Economic => self.business_decline,
            Category::PhysicalStock => self.aged_buildings,
        }
    }

    /// Supporting number for a category.
    pub fn headline(&self, category: Category) -> f64 {
        match category {
            Category::Demographic => self.population_rate,
            Category::Economic => self.business_rate,
            Category::PhysicalStock => self.old_building_ratio,
        }
    }
}

/// Table preview handed to the display layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    /// Column labels in display order.
    pub headers: Vec<String>,
    /// One map per row, keyed by column label.
    pub rows: Vec<BTreeMap<String, String>>,
}

/// Everything produced by one export call.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    /// BOM-prefixed UTF-8 comma-delimited text.
    pub delimited_text: Vec<u8>,
    /// XLSX workbook bytes.
    pub spreadsheet: Vec<u8>,
    pub preview: Preview,
}

/// Result record returned to the caller of the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<Preview>,
    #[serde(skip)]
    pub text_artifact: Option<Vec<u8>>,
    #[serde(skip)]
    pub spreadsheet_artifact: Option<Vec<u8>>,
}

impl PipelineOutcome {
    /// A failed run carries only the message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            preview: None,
            text_artifact: None,
            spreadsheet_artifact: None,
        }
    }

    pub fn succeeded(message: impl Into<String>, artifact: ExportArtifact) -> Self {
        Self {
            success: true,
            message: message.into(),
            preview: Some(artifact.preview),
            text_artifact: Some(artifact.delimited_text),
            spreadsheet_artifact: Some(artifact.spreadsheet),
        }
    }
}

/// Lifecycle of one selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Success,
    Failed(String),
}
