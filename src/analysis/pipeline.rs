use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::analysis::clustering::cluster_lines;
use crate::analysis::line_fitting::{FitOptions, fit_lines};
use crate::analysis::pivots::{PivotOptions, find_pivots_with};
use crate::analysis::ranking::{assign_scores, build_overlays, rank_and_select};
use crate::analysis::touches::{TouchOptions, measure_lines, partition_by_touches};
use crate::config::TrendlineParams;
use crate::domain::candle::PricePoint;
use crate::domain::pivot::PivotKind;
use crate::error::Result;
use crate::models::{CandidateLine, OhlcvTimeSeries, OverlayDescriptor, TrendlineCluster};

/// Per-lookback counters, useful for callers that log a run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LookbackStats {
    pub lookback: usize,
    pub high_pivots: usize,
    pub low_pivots: usize,
    /// Pairwise lines fitted before the touch filter
    pub candidates: usize,
    /// Lines that met `min_touches`
    pub kept: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineStats {
    pub bars: usize,
    pub lookbacks: Vec<LookbackStats>,
    /// Cluster count before `top_n` truncation
    pub clusters: usize,
}

impl PipelineStats {
    pub fn total_candidates(&self) -> usize {
        self.lookbacks.iter().map(|s| s.candidates).sum()
    }

    pub fn total_kept(&self) -> usize {
        self.lookbacks.iter().map(|s| s.kept).sum()
    }
}

/// Output of one pipeline run: ranked clusters and their overlays (same order).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendlineAnalysis {
    pub symbol: String,
    pub clusters: Vec<TrendlineCluster>,
    pub overlays: Vec<OverlayDescriptor>,
    pub stats: PipelineStats,
}

// Pivots -> pairwise lines (highs first, then lows) -> touch filter, for one lookback
fn lines_for_lookback(
    series: &OhlcvTimeSeries,
    lookback: usize,
    params: &TrendlineParams,
) -> Result<(Vec<CandidateLine>, LookbackStats)> {
    let (highs, lows) = find_pivots_with(series, lookback, &PivotOptions::from(params))?;

    let fit_options = FitOptions::from(params);
    let mut candidates = Vec::new();
    for kind in PivotKind::iter() {
        let pivots = match kind {
            PivotKind::High => &highs,
            PivotKind::Low => &lows,
        };
        candidates.extend(fit_lines(pivots, lookback, &fit_options));
    }
    let candidate_count = candidates.len();

    let measured = measure_lines(candidates, series, &TouchOptions::from(params));
    let (kept, _dropped) = partition_by_touches(measured, params.min_touches);

    let stats = LookbackStats {
        lookback,
        high_pivots: highs.len(),
        low_pivots: lows.len(),
        candidates: candidate_count,
        kept: kept.len(),
    };
    Ok((kept, stats))
}

/// Runs the whole detection pipeline on one series.
///
/// Parameters and series are validated first; nothing is computed on invalid
/// input. Each lookback is processed independently (on the rayon pool when
/// `params.parallel` is set) and the surviving lines are concatenated in
/// ascending lookback order, so clustering sees the same sequence either way.
/// Too few bars, pivots or touches simply give an empty result.
pub fn run_pipeline(series: &OhlcvTimeSeries, params: &TrendlineParams) -> Result<TrendlineAnalysis> {
    params.validate()?;
    series.validate()?;

    let lookbacks = params.sorted_lookbacks();
    let per_lookback: Vec<(Vec<CandidateLine>, LookbackStats)> = if params.parallel {
        lookbacks
            .par_iter()
            .map(|&lookback| lines_for_lookback(series, lookback, params))
            .collect::<Result<_>>()?
    } else {
        lookbacks
            .iter()
            .map(|&lookback| lines_for_lookback(series, lookback, params))
            .collect::<Result<_>>()?
    };

    let mut lookback_stats = Vec::with_capacity(per_lookback.len());
    let mut candidates = Vec::new();
    for (lines, stats) in per_lookback {
        candidates.extend(lines);
        lookback_stats.push(stats);
    }

    let mut clusters = cluster_lines(&candidates, params.slope_tolerance, params.intercept_tolerance);
    assign_scores(&mut clusters, &params.scoring, series);
    let cluster_count = clusters.len();

    let ranked = rank_and_select(clusters, params.scoring.min_score, params.top_n);
    let overlays = build_overlays(&ranked, series, params.right_edge, params.role_policy);

    Ok(TrendlineAnalysis {
        symbol: series.symbol.clone(),
        clusters: ranked,
        overlays,
        stats: PipelineStats {
            bars: series.len(),
            lookbacks: lookback_stats,
            clusters: cluster_count,
        },
    })
}

/// Function-call boundary for callers holding plain bars: ranked overlay descriptors.
pub fn detect_trendlines(
    points: &[PricePoint],
    params: &TrendlineParams,
) -> Result<Vec<OverlayDescriptor>> {
    params.validate()?;
    let series = OhlcvTimeSeries::from_points("", points)?;
    Ok(run_pipeline(&series, params)?.overlays)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::error::{Stage, TrendlineError};
    use crate::models::LineRole;
    use crate::models::timeseries::test_support::*;

    fn scenario_params(lookbacks: Vec<usize>) -> TrendlineParams {
        TrendlineParams {
            lookbacks,
            min_touches: 2,
            tolerance_pct: 0.005,
            ..TrendlineParams::default()
        }
    }

    // Oscillating drift with plenty of pivots of both kinds
    fn wavy_series(len: usize) -> OhlcvTimeSeries {
        let closes: Vec<f64> = (0..len)
            .map(|i| {
                let x = i as f64;
                100.0 + 8.0 * (x / 4.0).sin() + 3.0 * (x / 11.0).cos() + 0.1 * x
            })
            .collect();
        let highs: Vec<f64> = closes.iter().map(|c| c + 0.8).collect();
        let lows: Vec<f64> = closes.iter().map(|c| c - 0.8).collect();
        series_from_columns(&closes, &highs, &lows)
    }

    #[test]
    fn two_swing_lows_give_one_support_line() {
        let series = uptrend_with_two_swing_lows();
        let analysis = run_pipeline(&series, &scenario_params(vec![5])).unwrap();

        assert_eq!(analysis.overlays.len(), 1);
        let line = &analysis.overlays[0];
        assert_eq!(line.role_hint, LineRole::Support);
        assert!(line.slope > 0.0);
        assert!(line.touches.contains(&ts(SWING_LOW_A)));
        assert!(line.touches.contains(&ts(SWING_LOW_B)));
        assert_eq!(line.start.timestamp_ms, ts(SWING_LOW_A));

        assert_eq!(analysis.stats.bars, 100);
        assert_eq!(analysis.stats.lookbacks[0].low_pivots, 2);
        assert_eq!(analysis.stats.lookbacks[0].high_pivots, 0);
        assert_eq!(analysis.stats.total_kept(), 1);
    }

    #[test]
    fn detect_trendlines_matches_run_pipeline() {
        let series = uptrend_with_two_swing_lows();
        let params = scenario_params(vec![5]);
        let overlays = detect_trendlines(&series.points(), &params).unwrap();
        assert_eq!(overlays, run_pipeline(&series, &params).unwrap().overlays);
    }

    #[test]
    fn lines_from_different_lookbacks_merge() {
        let series = uptrend_with_two_swing_lows();
        let analysis = run_pipeline(&series, &scenario_params(vec![10, 5])).unwrap();

        assert_eq!(analysis.clusters.len(), 1);
        let cluster = &analysis.clusters[0];
        assert_eq!(cluster.member_count, 2);
        assert_eq!(cluster.lookbacks, BTreeSet::from([5, 10]));
        assert_eq!(cluster.lookback, 5);
        assert_eq!(cluster.kind, PivotKind::Low);
        assert_eq!(
            cluster.touches,
            BTreeSet::from([ts(SWING_LOW_A), ts(SWING_LOW_B)])
        );
        let stat_lookbacks: Vec<usize> = analysis.stats.lookbacks.iter().map(|s| s.lookback).collect();
        assert_eq!(stat_lookbacks, vec![5, 10]);
    }

    #[test]
    fn flat_series_gives_nothing() {
        for len in [1, 10, 200] {
            let series = flat_series(len, 42.0);
            let analysis = run_pipeline(&series, &scenario_params(vec![3, 5])).unwrap();
            assert!(analysis.clusters.is_empty());
            assert!(analysis.overlays.is_empty());
            assert_eq!(analysis.stats.total_candidates(), 0);
        }
    }

    #[test]
    fn short_series_is_empty_not_an_error() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + (i % 3) as f64).collect();
        let series = series_from_closes(&closes);
        let analysis = run_pipeline(&series, &scenario_params(vec![5])).unwrap();
        assert!(analysis.overlays.is_empty());
    }

    #[test]
    fn min_score_drops_weak_lines() {
        let series = uptrend_with_two_swing_lows();
        let mut params = scenario_params(vec![5]);

        params.scoring.min_score = Some(-1.0);
        assert_eq!(run_pipeline(&series, &params).unwrap().overlays.len(), 1);

        // Weighted scores never exceed the sum of the positive weights
        params.scoring.min_score = Some(1.5);
        let analysis = run_pipeline(&series, &params).unwrap();
        assert!(analysis.overlays.is_empty());
        assert_eq!(analysis.stats.total_kept(), 1);
    }

    #[test]
    fn huge_lookback_is_empty_not_a_panic() {
        let series = uptrend_with_two_swing_lows();
        let analysis = run_pipeline(&series, &scenario_params(vec![usize::MAX])).unwrap();
        assert!(analysis.overlays.is_empty());
        assert_eq!(analysis.stats.lookbacks[0].low_pivots, 0);

        // Alongside a usable lookback the usable one still produces its line
        let analysis = run_pipeline(&series, &scenario_params(vec![5, usize::MAX])).unwrap();
        assert_eq!(analysis.overlays.len(), 1);
    }

    #[test]
    fn empty_series_is_rejected() {
        let series = OhlcvTimeSeries::default();
        let err = run_pipeline(&series, &TrendlineParams::default()).unwrap_err();
        assert!(matches!(
            err,
            TrendlineError::Validation {
                stage: Stage::SeriesValidation,
                ..
            }
        ));
        assert!(detect_trendlines(&[], &TrendlineParams::default()).is_err());
    }

    #[test]
    fn malformed_series_is_rejected_before_analysis() {
        let mut series = uptrend_with_two_swing_lows();
        series.close_prices[7] = f64::NAN;
        assert!(run_pipeline(&series, &TrendlineParams::default()).is_err());

        let mut series = uptrend_with_two_swing_lows();
        series.timestamps_ms.swap(3, 4);
        assert!(run_pipeline(&series, &TrendlineParams::default()).is_err());
    }

    #[test]
    fn invalid_params_are_rejected() {
        let series = uptrend_with_two_swing_lows();
        let params = TrendlineParams {
            tolerance_pct: 0.0,
            ..TrendlineParams::default()
        };
        let err = run_pipeline(&series, &params).unwrap_err();
        assert!(matches!(
            err,
            TrendlineError::Config {
                field: "tolerance_pct",
                ..
            }
        ));

        let params = TrendlineParams {
            lookbacks: vec![5, 0],
            ..TrendlineParams::default()
        };
        assert!(run_pipeline(&series, &params).is_err());
    }

    #[test]
    fn output_is_deterministic_and_parallel_safe() {
        let series = wavy_series(300);
        let params = TrendlineParams {
            lookbacks: vec![3, 5, 8],
            ..TrendlineParams::default()
        };
        let sequential = TrendlineParams {
            parallel: false,
            ..params.clone()
        };

        let first = run_pipeline(&series, &params).unwrap();
        let second = run_pipeline(&series, &params).unwrap();
        let serial = run_pipeline(&series, &sequential).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, serial);
        assert_eq!(
            serde_json::to_string(&first.overlays).unwrap(),
            serde_json::to_string(&serial.overlays).unwrap()
        );
    }

    #[test]
    fn ranked_output_honours_min_touches_order_and_top_n() {
        let series = wavy_series(300);
        let params = TrendlineParams {
            lookbacks: vec![3, 5],
            min_touches: 3,
            ..TrendlineParams::default()
        };
        let all = run_pipeline(&series, &params).unwrap();
        assert!(!all.clusters.is_empty());
        assert_eq!(all.clusters.len(), all.overlays.len());
        assert_eq!(all.clusters.len(), all.stats.clusters);

        for cluster in &all.clusters {
            assert!(cluster.touch_count() >= params.min_touches);
        }
        for pair in all.clusters.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.score >= b.score);
            if a.score == b.score {
                assert!(a.touch_count() >= b.touch_count());
            }
        }

        let top = run_pipeline(
            &series,
            &TrendlineParams {
                top_n: Some(2),
                ..params.clone()
            },
        )
        .unwrap();
        assert_eq!(top.clusters.len(), 2.min(all.clusters.len()));
        assert_eq!(top.clusters[..], all.clusters[..top.clusters.len()]);
    }
}
