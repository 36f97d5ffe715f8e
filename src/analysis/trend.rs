//! Trend decline detection over a yearly series.
//!
//! Shared by the population and business analyzers: both look for a peak,
//! measure the fall from that peak to the latest year with data, and look
//! for a run of consecutive drops in the trailing years with data.

use crate::models::{RegionSeries, TrendAnalysis};
use std::collections::BTreeSet;

/// Number of trailing years with data inspected for consecutive drops.
pub const DECLINE_WINDOW: usize = 5;

/// Category-specific knobs of the trend algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendRule {
    /// Restrict peak detection to this many most recent years with data.
    pub peak_window: Option<usize>,
    /// Condition A holds when the decline rate is at or below this percentage.
    pub sharp_threshold: f64,
    /// Report a 0% rate when the peak year is the latest year.
    pub require_distinct_peak: bool,
}

/// Parse a raw cell; blanks and non-finite values are treated as missing.
pub fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Round to two decimals, half away from zero. Never returns -0.0.
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Years with a parseable value, ascending.
pub fn data_points<'a>(series: &'a RegionSeries, years: &'a [String]) -> Vec<(&'a str, f64)> {
    years
        .iter()
        .filter_map(|year| parse_value(series.raw(year)).map(|v| (year.as_str(), v)))
        .collect()
}

/// First point holding the maximum value.
pub fn find_peak<'a>(points: &[(&'a str, f64)]) -> Option<(&'a str, f64)> {
    let mut peak: Option<(&'a str, f64)> = None;
    for &(year, value) in points {
        match peak {
            Some((_, best)) if value <= best => {}
            _ => peak = Some((year, value)),
        }
    }
    peak
}

/// Unrounded percent change from peak to latest; 0 unless both are positive.
pub fn decline_rate(peak: f64, latest: f64) -> f64 {
    if peak > 0.0 && latest > 0.0 {
        (latest - peak) * 100.0 / peak
    } else {
        0.0
    }
}

/// Consecutive drops found in the trailing window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclineRun {
    /// Longest run of strictly decreasing adjacent steps.
    pub longest: usize,
    /// Every year that closes a decreasing step.
    pub years: BTreeSet<String>,
}

/// Scan the last `window` points for strictly decreasing steps.
pub fn decline_run(points: &[(&str, f64)], window: usize) -> DeclineRun {
    let tail = &points[points.len().saturating_sub(window)..];
    let mut run = DeclineRun::default();
    let mut current = 0usize;

    for pair in tail.windows(2) {
        let (_, before) = pair[0];
        let (year, after) = pair[1];
        if after < before {
            current += 1;
            run.years.insert(year.to_string());
            run.longest = run.longest.max(current);
        } else {
            current = 0;
        }
    }

    run
}

/// Evaluate one region's series.
pub fn analyze_series(
    series: &RegionSeries,
    years: &[String],
    rule: &TrendRule,
    min_consecutive_drops: usize,
) -> TrendAnalysis {
    let points = data_points(series, years);
    let Some(&(latest_year, latest)) = points.last() else {
        return TrendAnalysis::default();
    };

    let candidates = match rule.peak_window {
        Some(n) => &points[points.len().saturating_sub(n)..],
        None => &points[..],
    };
    let (peak_year, peak) = find_peak(candidates).unwrap_or((latest_year, latest));

    let decline_rate = if rule.require_distinct_peak && peak_year == latest_year {
        0.0
    } else {
        decline_rate(peak, latest)
    };

    let run = decline_run(&points, DECLINE_WINDOW);

    TrendAnalysis {
        peak_year: Some(peak_year.to_string()),
        latest_year: Some(latest_year.to_string()),
        sharp_decline: decline_rate <= rule.sharp_threshold,
        sustained_decline: run.longest >= min_consecutive_drops,
        decline_years: run.years,
        decline_rate: round2(decline_rate),
    }
}
