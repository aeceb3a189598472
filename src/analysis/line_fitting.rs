use std::collections::BTreeSet;

use itertools::Itertools;

use crate::config::params::TrendlineParams;
use crate::domain::pivot::Pivot;
use crate::models::CandidateLine;
use crate::utils::maths_utils::linear_regression;

/// Constraints on which pivot pairs are worth fitting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Minimum index distance between the two anchors
    pub min_span_bars: usize,
    pub max_span_bars: Option<usize>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            min_span_bars: 1,
            max_span_bars: None,
        }
    }
}

impl From<&TrendlineParams> for FitOptions {
    fn from(params: &TrendlineParams) -> Self {
        Self {
            min_span_bars: params.min_pair_span_bars,
            max_span_bars: params.max_pair_span_bars,
        }
    }
}

/// Fits one candidate line through every pair of same-kind pivots.
///
/// `pivots` must be ordered by index (as produced by pivot extraction); pairs are
/// emitted in discovery order `(0,1), (0,2), .., (1,2), ..`. A two-point fit is
/// exact, so r² starts at 1.0; touches and violations are filled in later.
/// Pairs of mixed kind, identical timestamps or out-of-range spans are skipped.
/// O(k²) in the number of pivots.
pub fn fit_lines(pivots: &[Pivot], lookback: usize, options: &FitOptions) -> Vec<CandidateLine> {
    pivots
        .iter()
        .tuple_combinations()
        .filter(|(p1, p2)| p1.kind == p2.kind && p1.timestamp_ms != p2.timestamp_ms)
        .filter(|(p1, p2)| {
            let span = p2.index.abs_diff(p1.index);
            span >= options.min_span_bars && options.max_span_bars.is_none_or(|max| span <= max)
        })
        .filter_map(|(p1, p2)| {
            let (first, second) = if p1.index <= p2.index { (p1, p2) } else { (p2, p1) };
            let fit = linear_regression(&[
                (first.index as f64, first.price),
                (second.index as f64, second.price),
            ])?;
            Some(CandidateLine {
                slope: fit.slope,
                intercept: fit.intercept,
                r_squared: fit.r_squared,
                touches: BTreeSet::new(),
                violation_count: 0,
                lookback,
                kind: first.kind,
                anchors: (*first, *second),
            })
        })
        .collect()
}
