use std::collections::BTreeSet;

use crate::config::params::{ReferencePrice, TrendlineParams, ViolationRule};
use crate::domain::pivot::PivotKind;
use crate::models::{CandidateLine, OhlcvTimeSeries};
use crate::utils::maths_utils::{linear_regression, relative_distance};

/// How bars are compared with a line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchOptions {
    pub tolerance_pct: f64,
    pub reference: ReferencePrice,
    pub violation_rule: ViolationRule,
    pub break_tolerance_pct: f64,
    /// Replace the two-point r² with an OLS fit over the touch points
    pub touch_regression: bool,
}

impl TouchOptions {
    pub fn new(tolerance_pct: f64) -> Self {
        Self {
            tolerance_pct,
            reference: ReferencePrice::Close,
            violation_rule: ViolationRule::Close,
            break_tolerance_pct: 0.0,
            touch_regression: false,
        }
    }
}

impl From<&TrendlineParams> for TouchOptions {
    fn from(params: &TrendlineParams) -> Self {
        Self {
            tolerance_pct: params.tolerance_pct,
            reference: params.reference_price,
            violation_rule: params.violation_rule,
            break_tolerance_pct: params.break_tolerance_pct,
            touch_regression: params.touch_regression,
        }
    }
}

// Price on bar `idx` that represents the bar when measured against the line
fn reference_value(
    series: &OhlcvTimeSeries,
    idx: usize,
    kind: PivotKind,
    reference: ReferencePrice,
    projected: f64,
) -> f64 {
    match (reference, kind) {
        (ReferencePrice::Close, _) => series.close_prices[idx],
        (ReferencePrice::Wick, PivotKind::Low) => series.low_prices[idx],
        (ReferencePrice::Wick, PivotKind::High) => series.high_prices[idx],
        (ReferencePrice::Range, _) => projected.clamp(series.low_prices[idx], series.high_prices[idx]),
    }
}

fn is_touch(
    series: &OhlcvTimeSeries,
    idx: usize,
    kind: PivotKind,
    projected: f64,
    options: &TouchOptions,
) -> bool {
    match options.reference {
        ReferencePrice::Range => {
            let slack = options.tolerance_pct * projected.abs();
            series.get_point(idx).spans(projected, slack)
        }
        reference => {
            let price = reference_value(series, idx, kind, reference, projected);
            relative_distance(price, projected) <= options.tolerance_pct
        }
    }
}

fn is_violation(
    series: &OhlcvTimeSeries,
    idx: usize,
    kind: PivotKind,
    projected: f64,
    options: &TouchOptions,
) -> bool {
    let probe = match (options.violation_rule, kind) {
        (ViolationRule::Off, _) => return false,
        (ViolationRule::Close, _) => series.close_prices[idx],
        (ViolationRule::Wick, PivotKind::Low) => series.low_prices[idx],
        (ViolationRule::Wick, PivotKind::High) => series.high_prices[idx],
    };
    let margin = options.break_tolerance_pct * projected.abs();
    match kind {
        // Support breaks downwards, resistance upwards
        PivotKind::Low => probe < projected - margin,
        PivotKind::High => probe > projected + margin,
    }
}

/// Scans the full series against `line`.
///
/// Returns the timestamps of bars within `tolerance_pct` of the projected price
/// and the number of bars from the line's first anchor onwards that cross it
/// by more than the break tolerance (touch bars never count as violations).
pub fn count_touches(
    line: &CandidateLine,
    series: &OhlcvTimeSeries,
    options: &TouchOptions,
) -> (BTreeSet<i64>, usize) {
    let mut touches = BTreeSet::new();
    let mut violations = 0;

    for idx in 0..series.len() {
        let projected = line.project(idx);
        if is_touch(series, idx, line.kind, projected, options) {
            touches.insert(series.timestamps_ms[idx]);
        } else if idx >= line.start_index()
            && is_violation(series, idx, line.kind, projected, options)
        {
            violations += 1;
        }
    }

    (touches, violations)
}

/// r² of an OLS fit through the touch points (bar index, reference price).
/// `None` with fewer than two touches.
pub fn touch_r_squared(
    line: &CandidateLine,
    series: &OhlcvTimeSeries,
    reference: ReferencePrice,
) -> Option<f64> {
    let points: Vec<(f64, f64)> = line
        .touches
        .iter()
        .filter_map(|&ts| series.index_of(ts))
        .map(|idx| {
            let value = reference_value(series, idx, line.kind, reference, line.project(idx));
            (idx as f64, value)
        })
        .collect();
    linear_regression(&points).map(|fit| fit.r_squared)
}

/// Fills in touches, violations and (optionally) the N-point r² for each line.
/// Touches are computed once, against the original full series.
pub fn measure_lines(
    mut lines: Vec<CandidateLine>,
    series: &OhlcvTimeSeries,
    options: &TouchOptions,
) -> Vec<CandidateLine> {
    for line in lines.iter_mut() {
        let (touches, violations) = count_touches(line, series, options);
        line.touches = touches;
        line.violation_count = violations;
        if options.touch_regression
            && let Some(r_squared) = touch_r_squared(line, series, options.reference)
        {
            line.r_squared = r_squared;
        }
    }
    lines
}

/// Splits measured lines into `(kept, dropped)` by `min_touches`, preserving order.
pub fn partition_by_touches(
    lines: Vec<CandidateLine>,
    min_touches: usize,
) -> (Vec<CandidateLine>, Vec<CandidateLine>) {
    lines
        .into_iter()
        .partition(|line| line.touch_count() >= min_touches)
}

/// Measures `lines` and keeps those with at least `min_touches` touches.
pub fn filter_by_touches(
    lines: Vec<CandidateLine>,
    series: &OhlcvTimeSeries,
    options: &TouchOptions,
    min_touches: usize,
) -> Vec<CandidateLine> {
    let measured = measure_lines(lines, series, options);
    partition_by_touches(measured, min_touches).0
}
