//! Presentation tables.
//!
//! Flattens category results and summary rows into labelled string cells.
//! Every exporter (delimited text, workbook, preview) renders from a
//! [`TableView`], so all three agree on column order and labels.

use crate::models::{
    Category, CategoryResult, RegionAnalysis, RegionRow, StockAnalysis, SummaryRow, TrendAnalysis,
    Verdict,
};

/// Name of the summary worksheet.
pub const SUMMARY_SHEET: &str = "Summary";

/// Display-only annotation on a year cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Peak,
    Declining,
}

impl Marker {
    /// Text appended to the cell value in previews.
    pub fn suffix(&self) -> &'static str {
        match self {
            Marker::Peak => " (peak)",
            Marker::Declining => " (declining)",
        }
    }
}

/// One table cell: the stored value and an optional preview marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub value: String,
    pub marker: Option<Marker>,
}

impl Cell {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            marker: None,
        }
    }

    /// Value with its marker appended.
    pub fn display(&self) -> String {
        match self.marker {
            Some(marker) => format!("{}{}", self.value, marker.suffix()),
            None => self.value.clone(),
        }
    }
}

/// Result fields that appear as columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    RegionCode,
    PeakYear,
    LatestYear,
    DeclineRate,
    SharpDecline,
    SustainedDecline,
    TotalBuildings,
    OldBuildings,
    OldRatio,
    Verdict,
    CriteriaMet,
}

impl Field {
    fn base_label(&self) -> &'static str {
        match self {
            Field::RegionCode => "Region Code",
            Field::PeakYear => "Peak Year",
            Field::LatestYear => "Latest Year",
            Field::DeclineRate => "Decline Rate (%)",
            Field::SharpDecline => "Sharp Decline",
            Field::SustainedDecline => "Sustained Decline",
            Field::TotalBuildings => "Total Buildings",
            Field::OldBuildings => "Old Buildings",
            Field::OldRatio => "Old Ratio (%)",
            Field::Verdict => "Verdict",
            Field::CriteriaMet => "Criteria Met",
        }
    }

    /// Column label; category-specific fields get the category prefix in the summary.
    pub fn label(&self, prefix: Option<Category>) -> String {
        match (self, prefix) {
            (Field::RegionCode | Field::CriteriaMet, _) | (_, None) => self.base_label().to_string(),
            (_, Some(category)) => format!("{} {}", category.label(), self.base_label()),
        }
    }
}

/// A labelled table ready for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl TableView {
    /// Table of one category: region, year columns (for trends) and findings.
    pub fn category(result: &CategoryResult) -> Self {
        let mut headers = vec![Field::RegionCode.label(None)];
        let fields: &[Field] = match result.category {
            Category::Demographic | Category::Economic => {
                headers.extend(result.years.iter().cloned());
                &[
                    Field::PeakYear,
                    Field::LatestYear,
                    Field::DeclineRate,
                    Field::SharpDecline,
                    Field::SustainedDecline,
                    Field::Verdict,
                ]
            }
            Category::PhysicalStock => &[
                Field::TotalBuildings,
                Field::OldBuildings,
                Field::OldRatio,
                Field::Verdict,
            ],
        };
        headers.extend(fields.iter().map(|field| field.label(None)));

        let rows = result
            .rows
            .iter()
            .map(|row| category_row(row, &result.years))
            .collect();

        Self {
            sheet_name: result.category.label().to_string(),
            headers,
            rows,
        }
    }

    /// Cross-category summary table.
    pub fn summary(rows: &[SummaryRow]) -> Self {
        let mut headers = vec![Field::RegionCode.label(None)];
        for category in Category::ALL {
            let headline = match category {
                Category::PhysicalStock => Field::OldRatio,
                _ => Field::DeclineRate,
            };
            headers.push(Field::Verdict.label(Some(category)));
            headers.push(headline.label(Some(category)));
        }
        headers.push(Field::CriteriaMet.label(None));

        let rows = rows
            .iter()
            .map(|row| {
                let mut cells = vec![Cell::plain(row.region_code.clone())];
                for category in Category::ALL {
                    cells.push(Cell::plain(Verdict::from(row.verdict(category)).to_string()));
                    cells.push(Cell::plain(format_rate(row.headline(category))));
                }
                cells.push(Cell::plain(row.criteria_met.to_string()));
                cells
            })
            .collect();

        Self {
            sheet_name: SUMMARY_SHEET.to_string(),
            headers,
            rows,
        }
    }
}

fn category_row(row: &RegionRow, years: &[String]) -> Vec<Cell> {
    let mut cells = vec![Cell::plain(row.region_code())];
    match &row.analysis {
        RegionAnalysis::Trend(trend) => {
            cells.extend(years.iter().map(|year| year_cell(row, trend, year)));
            cells.extend(trend_cells(trend));
        }
        RegionAnalysis::Stock(stock) => cells.extend(stock_cells(stock)),
    }
    cells
}

fn year_cell(row: &RegionRow, trend: &TrendAnalysis, year: &str) -> Cell {
    let marker = if trend.peak_year.as_deref() == Some(year) {
        Some(Marker::Peak)
    } else if trend.decline_years.contains(year) {
        Some(Marker::Declining)
    } else {
        None
    };

    Cell {
        value: row.series.raw(year).to_string(),
        marker,
    }
}

fn trend_cells(trend: &TrendAnalysis) -> Vec<Cell> {
    vec![
        Cell::plain(trend.peak_year.clone().unwrap_or_default()),
        Cell::plain(trend.latest_year.clone().unwrap_or_default()),
        Cell::plain(format_rate(trend.decline_rate)),
        Cell::plain(Verdict::from(trend.sharp_decline).to_string()),
        Cell::plain(Verdict::from(trend.sustained_decline).to_string()),
        Cell::plain(Verdict::from(trend.meets()).to_string()),
    ]
}

fn stock_cells(stock: &StockAnalysis) -> Vec<Cell> {
    vec![
        Cell::plain(format_count(stock.total)),
        Cell::plain(format_count(stock.old)),
        Cell::plain(format_rate(stock.old_ratio)),
        Cell::plain(Verdict::from(stock.aged).to_string()),
    ]
}

/// Percentages always carry two decimals.
pub fn format_rate(value: f64) -> String {
    format!("{:.2}", value)
}

/// Whole counts print without a fraction.
pub fn format_count(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RegionSeries;
    use std::collections::BTreeSet;

    fn population() -> CategoryResult {
        let mut series = RegionSeries::new("11010");
        for (year, value) in [("2018", "120"), ("2019", "110"), ("2020", "100")] {
            series.values.insert(year.to_string(), value.to_string());
        }
        let decline_years: BTreeSet<String> =
            ["2019", "2020"].iter().map(|y| y.to_string()).collect();

        CategoryResult {
            category: Category::Demographic,
            years: vec!["2017".into(), "2018".into(), "2019".into(), "2020".into()],
            rows: vec![RegionRow {
                series,
                analysis: RegionAnalysis::Trend(TrendAnalysis {
                    peak_year: Some("2018".into()),
                    latest_year: Some("2020".into()),
                    decline_years,
                    decline_rate: -16.666,
                    sharp_decline: false,
                    sustained_decline: true,
                }),
            }],
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(Field::Verdict.label(None), "Verdict");
        assert_eq!(
            Field::Verdict.label(Some(Category::Demographic)),
            "Population Verdict"
        );
        assert_eq!(
            Field::RegionCode.label(Some(Category::Economic)),
            "Region Code"
        );
        assert_eq!(
            Field::OldRatio.label(Some(Category::PhysicalStock)),
            "Buildings Old Ratio (%)"
        );
    }

    #[test]
    fn test_category_view_headers_and_markers() {
        let view = TableView::category(&population());

        assert_eq!(view.sheet_name, "Population");
        assert_eq!(
            view.headers,
            vec![
                "Region Code",
                "2017",
                "2018",
                "2019",
                "2020",
                "Peak Year",
                "Latest Year",
                "Decline Rate (%)",
                "Sharp Decline",
                "Sustained Decline",
                "Verdict"
            ]
        );

        let row = &view.rows[0];
        assert_eq!(row[0].value, "11010");
        assert_eq!(row[1], Cell::plain(""));
        assert_eq!(row[2].marker, Some(Marker::Peak));
        assert_eq!(row[3].display(), "110 (declining)");
        assert_eq!(row[4].display(), "100 (declining)");
        assert_eq!(row[7].value, "-16.67");
        assert_eq!(row[8].value, "X");
        assert_eq!(row[9].value, "O");
        assert_eq!(row[10].value, "O");
    }

    #[test]
    fn test_peak_marker_takes_precedence() {
        let mut result = population();
        if let RegionAnalysis::Trend(trend) = &mut result.rows[0].analysis {
            trend.decline_years.insert("2018".to_string());
        }
        let view = TableView::category(&result);
        assert_eq!(view.rows[0][2].display(), "120 (peak)");
    }

    #[test]
    fn test_stock_view() {
        let result = CategoryResult {
            category: Category::PhysicalStock,
            years: vec!["2023".into()],
            rows: vec![RegionRow {
                series: RegionSeries::new("A"),
                analysis: RegionAnalysis::Stock(StockAnalysis {
                    total: 100.0,
                    old: 60.0,
                    old_ratio: 60.0,
                    aged: true,
                }),
            }],
        };
        let view = TableView::category(&result);

        assert_eq!(
            view.headers,
            vec!["Region Code", "Total Buildings", "Old Buildings", "Old Ratio (%)", "Verdict"]
        );
        let values: Vec<_> = view.rows[0].iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["A", "100", "60", "60.00", "O"]);
    }

    #[test]
    fn test_summary_view() {
        let rows = vec![SummaryRow {
            region_code: "A".into(),
            population_decline: true,
            population_rate: -40.0,
            business_decline: false,
            business_rate: 0.0,
            aged_buildings: true,
            old_building_ratio: 60.0,
            criteria_met: 2,
        }];
        let view = TableView::summary(&rows);

        assert_eq!(view.sheet_name, "Summary");
        assert_eq!(
            view.headers,
            vec![
                "Region Code",
                "Population Verdict",
                "Population Decline Rate (%)",
                "Business Verdict",
                "Business Decline Rate (%)",
                "Buildings Verdict",
                "Buildings Old Ratio (%)",
                "Criteria Met"
            ]
        );
        let values: Vec<_> = view.rows[0].iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["A", "O", "-40.00", "X", "0.00", "O", "60.00", "2"]);
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(100.0), "100");
        assert_eq!(format_count(2.5), "2.5");
        assert_eq!(format_rate(-5.0), "-5.00");
    }
}
