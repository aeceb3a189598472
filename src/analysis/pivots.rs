use crate::config::params::{PivotSource, TrendlineParams};
use crate::domain::pivot::{Pivot, PivotKind};
use crate::error::{Result, TrendlineError};
use crate::models::OhlcvTimeSeries;
use crate::utils::maths_utils::{get_max, get_min, relative_distance};

/// Knobs for pivot detection beyond the window size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PivotOptions {
    pub source: PivotSource,
    /// Skip a pivot whose price lies within this fraction of an accepted one (0 disables)
    pub dedupe_pct: f64,
}

impl From<&TrendlineParams> for PivotOptions {
    fn from(params: &TrendlineParams) -> Self {
        Self {
            source: params.pivot_source,
            dedupe_pct: params.pivot_dedupe_pct,
        }
    }
}

/// Swing highs and lows with default options (high/low prices, no de-duplication).
pub fn find_pivots(series: &OhlcvTimeSeries, lookback: usize) -> Result<(Vec<Pivot>, Vec<Pivot>)> {
    find_pivots_with(series, lookback, &PivotOptions::default())
}

/// Scans every bar that has `lookback` bars on both sides.
///
/// Bar `i` is a swing high when its price is strictly greater than every other
/// price in `[i - lookback, i + lookback]`, and a swing low when strictly lower.
/// Ties never produce a pivot, so flat stretches yield nothing. A bar that is
/// both the strict highest and strict lowest of its window appears in both lists.
/// The first and last `lookback` bars are never pivots.
pub fn find_pivots_with(
    series: &OhlcvTimeSeries,
    lookback: usize,
    options: &PivotOptions,
) -> Result<(Vec<Pivot>, Vec<Pivot>)> {
    if lookback < 1 {
        return Err(TrendlineError::config(
            "lookbacks",
            "pivot extraction needs lookback >= 1 (got 0)",
        ));
    }

    let mut highs: Vec<Pivot> = Vec::new();
    let mut lows: Vec<Pivot> = Vec::new();

    let len = series.len();
    // Window size saturates so huge lookbacks fall through as too short
    if len < lookback.saturating_mul(2).saturating_add(1) {
        return Ok((highs, lows));
    }

    let high_prices = series.pivot_prices(PivotKind::High, options.source);
    let low_prices = series.pivot_prices(PivotKind::Low, options.source);

    let near_existing = |price: f64, highs: &[Pivot], lows: &[Pivot]| {
        options.dedupe_pct > 0.0
            && highs
                .iter()
                .chain(lows.iter())
                .any(|p| relative_distance(price, p.price) < options.dedupe_pct)
    };

    for i in lookback..len - lookback {
        let hi = high_prices[i];
        if hi > get_max(&high_prices[i - lookback..i])
            && hi > get_max(&high_prices[i + 1..=i + lookback])
            && !near_existing(hi, &highs, &lows)
        {
            highs.push(Pivot {
                index: i,
                timestamp_ms: series.timestamps_ms[i],
                price: hi,
                kind: PivotKind::High,
            });
        }

        let lo = low_prices[i];
        if lo < get_min(&low_prices[i - lookback..i])
            && lo < get_min(&low_prices[i + 1..=i + lookback])
            && !near_existing(lo, &highs, &lows)
        {
            lows.push(Pivot {
                index: i,
                timestamp_ms: series.timestamps_ms[i],
                price: lo,
                kind: PivotKind::Low,
            });
        }
    }

    Ok((highs, lows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timeseries::test_support::*;

    fn indices(pivots: &[Pivot]) -> Vec<usize> {
        pivots.iter().map(|p| p.index).collect()
    }

    #[test]
    fn finds_simple_peak_and_trough() {
        let closes = [5.0, 6.0, 9.0, 6.0, 5.0, 2.0, 5.0, 6.0];
        let series = series_from_closes(&closes);

        let (highs, lows) = find_pivots(&series, 2).unwrap();
        assert_eq!(indices(&highs), vec![2]);
        assert_eq!(indices(&lows), vec![5]);
        assert_eq!(highs[0].price, 9.0);
        assert_eq!(highs[0].timestamp_ms, ts(2));
        assert_eq!(lows[0].kind, PivotKind::Low);
    }

    #[test]
    fn boundary_bars_are_excluded() {
        // Global extremes sit on the first and last bars
        let closes = [10.0, 5.0, 6.0, 5.0, 6.0, 5.0, 0.0];
        let series = series_from_closes(&closes);
        let (highs, lows) = find_pivots(&series, 1).unwrap();
        assert!(!indices(&highs).contains(&0));
        assert!(!indices(&lows).contains(&6));
        assert_eq!(indices(&highs), vec![2, 4]);
        assert_eq!(indices(&lows), vec![1, 3]);
    }

    #[test]
    fn series_of_two_lookbacks_has_no_pivots() {
        for lookback in 1..6 {
            let closes: Vec<f64> = (0..2 * lookback)
                .map(|i| if i == lookback { 50.0 } else { 10.0 })
                .collect();
            let series = series_from_closes(&closes);
            let (highs, lows) = find_pivots(&series, lookback).unwrap();
            assert!(highs.is_empty() && lows.is_empty(), "lookback {}", lookback);
        }
    }

    #[test]
    fn flat_series_has_no_pivots() {
        let series = flat_series(50, 100.0);
        let (highs, lows) = find_pivots(&series, 3).unwrap();
        assert!(highs.is_empty());
        assert!(lows.is_empty());
    }

    #[test]
    fn ties_do_not_pivot() {
        let closes = [1.0, 3.0, 3.0, 1.0, 0.5, 1.0];
        let series = series_from_closes(&closes);
        let (highs, _) = find_pivots(&series, 1).unwrap();
        assert!(highs.is_empty());
    }

    #[test]
    fn outside_bar_is_both_high_and_low() {
        let closes = [10.0, 10.0, 10.0, 10.0, 10.0];
        let highs = [11.0, 11.0, 20.0, 11.0, 11.0];
        let lows = [9.0, 9.0, 1.0, 9.0, 9.0];
        let series = series_from_columns(&closes, &highs, &lows);

        let (swing_highs, swing_lows) = find_pivots(&series, 2).unwrap();
        assert_eq!(indices(&swing_highs), vec![2]);
        assert_eq!(indices(&swing_lows), vec![2]);
    }

    #[test]
    fn close_source_ignores_wicks() {
        let closes = [10.0, 10.0, 10.0, 10.0, 10.0];
        let highs = [11.0, 11.0, 20.0, 11.0, 11.0];
        let lows = [9.0, 9.0, 1.0, 9.0, 9.0];
        let series = series_from_columns(&closes, &highs, &lows);

        let options = PivotOptions {
            source: PivotSource::Close,
            dedupe_pct: 0.0,
        };
        let (swing_highs, swing_lows) = find_pivots_with(&series, 2, &options).unwrap();
        assert!(swing_highs.is_empty() && swing_lows.is_empty());
    }

    #[test]
    fn dedupe_skips_near_equal_prices() {
        // Two peaks 0.1% apart
        let closes = [90.0, 100.0, 90.0, 80.0, 90.0, 100.1, 90.0];
        let series = series_from_closes(&closes);

        let (plain, _) = find_pivots(&series, 1).unwrap();
        assert_eq!(indices(&plain), vec![1, 5]);

        let options = PivotOptions {
            source: PivotSource::HighLow,
            dedupe_pct: 0.005,
        };
        let (deduped, lows) = find_pivots_with(&series, 1, &options).unwrap();
        assert_eq!(indices(&deduped), vec![1]);
        assert_eq!(indices(&lows), vec![3]);
    }

    #[test]
    fn zero_lookback_is_a_config_error() {
        let series = flat_series(10, 1.0);
        assert!(matches!(
            find_pivots(&series, 0),
            Err(TrendlineError::Config { .. })
        ));
    }

    #[test]
    fn oversized_lookback_yields_no_pivots() {
        let series = uptrend_with_two_swing_lows();
        for lookback in [series.len(), usize::MAX / 2, usize::MAX] {
            let (highs, lows) = find_pivots(&series, lookback).unwrap();
            assert!(highs.is_empty());
            assert!(lows.is_empty());
        }
    }

    #[test]
    fn scenario_series_has_exactly_two_swing_lows() {
        let series = uptrend_with_two_swing_lows();
        for lookback in [5, 10] {
            let (highs, lows) = find_pivots(&series, lookback).unwrap();
            assert!(highs.is_empty(), "lookback {}", lookback);
            assert_eq!(indices(&lows), vec![SWING_LOW_A, SWING_LOW_B]);
        }
    }
}
