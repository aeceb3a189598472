//! Typed parameter set for one trendline pipeline run.
//!
//! Every field has a default taken from [`TRENDLINE`], so a params file only
//! needs the keys it wants to override. Unknown keys are rejected at
//! deserialisation, and [`TrendlineParams::validate`] rejects out-of-range values
//! before any computation starts.

use serde::{Deserialize, Serialize};

use crate::config::analysis::TRENDLINE;
use crate::error::{Result, TrendlineError};

/// Which price a pivot is measured on.
#[derive(
    Copy, Clone, PartialEq, Eq, Default, Debug, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PivotSource {
    /// High for swing highs, low for swing lows
    #[default]
    HighLow,
    Close,
}

/// Which price is compared with a line's projection when counting touches.
#[derive(
    Copy, Clone, PartialEq, Eq, Default, Debug, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReferencePrice {
    #[default]
    Close,
    /// Low for support lines, high for resistance lines
    Wick,
    /// Touch when the line passes through the bar's low..high range (widened by tolerance)
    Range,
}

/// When a bar counts as breaking a line.
#[derive(
    Copy, Clone, PartialEq, Eq, Default, Debug, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ViolationRule {
    Off,
    /// Close beyond the line by more than the break tolerance
    #[default]
    Close,
    /// Low (support) or high (resistance) beyond the line by more than the break tolerance
    Wick,
}

/// Right end of a rendered overlay segment.
#[derive(
    Copy, Clone, PartialEq, Eq, Default, Debug, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RightEdge {
    #[default]
    LastTouch,
    /// Extend to the last bar of the series
    ChartEdge,
}

/// How the support/resistance hint is chosen.
#[derive(
    Copy, Clone, PartialEq, Eq, Default, Debug, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RolePolicy {
    /// Lines through swing lows are support, through swing highs resistance
    #[default]
    PivotKind,
    /// Support when the last close sits above the line, resistance otherwise
    PricePosition,
}

#[derive(
    Copy, Clone, PartialEq, Eq, Default, Debug, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScoreMode {
    /// Score is the mean r² of the cluster
    RSquared,
    /// Weighted blend of r², touches, recency and violations
    #[default]
    Weighted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringParams {
    pub mode: ScoreMode,
    pub r_squared_weight: f64,
    pub touches_weight: f64,
    pub recency_weight: f64,
    pub violation_weight: f64,
    /// Weighted mode only; 0 ignores how far the line is from the last close
    pub proximity_weight: f64,
    pub touch_norm: f64,
    /// Clusters scoring below this are dropped before `top_n`
    pub min_score: Option<f64>,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            mode: ScoreMode::default(),
            r_squared_weight: TRENDLINE.score.r_squared_weight,
            touches_weight: TRENDLINE.score.touches_weight,
            recency_weight: TRENDLINE.score.recency_weight,
            violation_weight: TRENDLINE.score.violation_weight,
            proximity_weight: TRENDLINE.score.proximity_weight,
            touch_norm: TRENDLINE.score.touch_norm,
            min_score: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrendlineParams {
    pub lookbacks: Vec<usize>,
    pub tolerance_pct: f64,
    pub min_touches: usize,
    pub slope_tolerance: f64,
    pub intercept_tolerance: f64,
    pub top_n: Option<usize>,

    pub pivot_source: PivotSource,
    pub pivot_dedupe_pct: f64,
    pub reference_price: ReferencePrice,
    pub violation_rule: ViolationRule,
    pub break_tolerance_pct: f64,
    pub min_pair_span_bars: usize,
    pub max_pair_span_bars: Option<usize>,
    pub touch_regression: bool,
    pub scoring: ScoringParams,
    pub right_edge: RightEdge,
    pub role_policy: RolePolicy,
    pub parallel: bool,
}

impl Default for TrendlineParams {
    fn default() -> Self {
        Self {
            lookbacks: vec![TRENDLINE.pivots.lookback],
            tolerance_pct: TRENDLINE.lines.touch_tolerance_pct,
            min_touches: TRENDLINE.lines.min_touches,
            slope_tolerance: TRENDLINE.clusters.slope_tolerance,
            intercept_tolerance: TRENDLINE.clusters.intercept_tolerance,
            top_n: None,
            pivot_source: PivotSource::default(),
            pivot_dedupe_pct: TRENDLINE.pivots.dedupe_pct,
            reference_price: ReferencePrice::default(),
            violation_rule: ViolationRule::default(),
            break_tolerance_pct: TRENDLINE.lines.break_tolerance_pct,
            min_pair_span_bars: TRENDLINE.lines.min_pair_span_bars,
            max_pair_span_bars: None,
            touch_regression: true,
            scoring: ScoringParams::default(),
            right_edge: RightEdge::default(),
            role_policy: RolePolicy::default(),
            parallel: true,
        }
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(TrendlineError::config(
            field,
            format!("must be finite and >= 0 (got {})", value),
        ));
    }
    Ok(())
}

impl TrendlineParams {
    /// Parse a JSON parameter document, rejecting unknown keys.
    pub fn from_json(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Lookbacks in processing order: ascending, duplicates collapsed.
    pub fn sorted_lookbacks(&self) -> Vec<usize> {
        let mut lookbacks = self.lookbacks.clone();
        lookbacks.sort_unstable();
        lookbacks.dedup();
        lookbacks
    }

    pub fn validate(&self) -> Result<()> {
        if self.lookbacks.is_empty() {
            return Err(TrendlineError::config(
                "lookbacks",
                "at least one lookback is required",
            ));
        }
        if let Some(bad) = self.lookbacks.iter().find(|&&lb| lb < 1) {
            return Err(TrendlineError::config(
                "lookbacks",
                format!("every lookback must be >= 1 (got {})", bad),
            ));
        }
        if !self.tolerance_pct.is_finite() || self.tolerance_pct <= 0.0 {
            return Err(TrendlineError::config(
                "tolerance_pct",
                format!("must be finite and > 0 (got {})", self.tolerance_pct),
            ));
        }
        if self.min_touches < 1 {
            return Err(TrendlineError::config("min_touches", "must be >= 1 (got 0)"));
        }
        require_non_negative("slope_tolerance", self.slope_tolerance)?;
        require_non_negative("intercept_tolerance", self.intercept_tolerance)?;
        require_non_negative("pivot_dedupe_pct", self.pivot_dedupe_pct)?;
        require_non_negative("break_tolerance_pct", self.break_tolerance_pct)?;

        if self.min_pair_span_bars < 1 {
            return Err(TrendlineError::config(
                "min_pair_span_bars",
                "must be >= 1 (got 0)",
            ));
        }
        if let Some(max_span) = self.max_pair_span_bars
            && max_span < self.min_pair_span_bars
        {
            return Err(TrendlineError::config(
                "max_pair_span_bars",
                format!(
                    "must be >= min_pair_span_bars ({} < {})",
                    max_span, self.min_pair_span_bars
                ),
            ));
        }

        let scoring = &self.scoring;
        require_non_negative("scoring.r_squared_weight", scoring.r_squared_weight)?;
        require_non_negative("scoring.touches_weight", scoring.touches_weight)?;
        require_non_negative("scoring.recency_weight", scoring.recency_weight)?;
        require_non_negative("scoring.violation_weight", scoring.violation_weight)?;
        require_non_negative("scoring.proximity_weight", scoring.proximity_weight)?;
        if !scoring.touch_norm.is_finite() || scoring.touch_norm <= 0.0 {
            return Err(TrendlineError::config(
                "scoring.touch_norm",
                format!("must be finite and > 0 (got {})", scoring.touch_norm),
            ));
        }
        if let Some(min_score) = scoring.min_score
            && !min_score.is_finite()
        {
            return Err(TrendlineError::config(
                "scoring.min_score",
                format!("must be finite (got {})", min_score),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = TrendlineParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.lookbacks, vec![5]);
        assert_eq!(params.min_touches, 3);
        assert_eq!(params.top_n, None);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let params =
            TrendlineParams::from_json(r#"{"lookbacks": [10, 5, 10], "top_n": 3}"#).unwrap();
        assert_eq!(params.sorted_lookbacks(), vec![5, 10]);
        assert_eq!(params.top_n, Some(3));
        assert_eq!(params.tolerance_pct, TRENDLINE.lines.touch_tolerance_pct);
        assert_eq!(params.reference_price, ReferencePrice::Close);
    }

    #[test]
    fn score_cut_and_proximity_are_opt_in() {
        let defaults = ScoringParams::default();
        assert_eq!(defaults.min_score, None);
        assert_eq!(defaults.proximity_weight, 0.0);

        let params = TrendlineParams::from_json(
            r#"{"scoring": {"min_score": 0.25, "proximity_weight": 0.3}}"#,
        )
        .unwrap();
        assert!(params.validate().is_ok());
        assert_eq!(params.scoring.min_score, Some(0.25));
        assert_eq!(params.scoring.proximity_weight, 0.3);
        assert_eq!(params.scoring.touch_norm, TRENDLINE.score.touch_norm);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(TrendlineParams::from_json(r#"{"lookback": 5}"#).is_err());
        assert!(TrendlineParams::from_json(r#"{"scoring": {"weight": 1.0}}"#).is_err());
    }

    #[test]
    fn enum_values_use_snake_case() {
        let params = TrendlineParams::from_json(
            r#"{"reference_price": "wick", "violation_rule": "off", "right_edge": "chart_edge",
                "role_policy": "price_position", "pivot_source": "close",
                "scoring": {"mode": "r_squared"}}"#,
        )
        .unwrap();
        assert_eq!(params.reference_price, ReferencePrice::Wick);
        assert_eq!(params.violation_rule, ViolationRule::Off);
        assert_eq!(params.right_edge, RightEdge::ChartEdge);
        assert_eq!(params.role_policy, RolePolicy::PricePosition);
        assert_eq!(params.pivot_source, PivotSource::Close);
        assert_eq!(params.scoring.mode, ScoreMode::RSquared);
    }

    #[test]
    fn invalid_values_name_the_field() {
        let cases: Vec<(TrendlineParams, &str)> = vec![
            (
                TrendlineParams {
                    lookbacks: vec![],
                    ..Default::default()
                },
                "lookbacks",
            ),
            (
                TrendlineParams {
                    lookbacks: vec![5, 0],
                    ..Default::default()
                },
                "lookbacks",
            ),
            (
                TrendlineParams {
                    tolerance_pct: 0.0,
                    ..Default::default()
                },
                "tolerance_pct",
            ),
            (
                TrendlineParams {
                    tolerance_pct: f64::NAN,
                    ..Default::default()
                },
                "tolerance_pct",
            ),
            (
                TrendlineParams {
                    slope_tolerance: -0.1,
                    ..Default::default()
                },
                "slope_tolerance",
            ),
            (
                TrendlineParams {
                    intercept_tolerance: -1.0,
                    ..Default::default()
                },
                "intercept_tolerance",
            ),
            (
                TrendlineParams {
                    min_touches: 0,
                    ..Default::default()
                },
                "min_touches",
            ),
            (
                TrendlineParams {
                    min_pair_span_bars: 10,
                    max_pair_span_bars: Some(5),
                    ..Default::default()
                },
                "max_pair_span_bars",
            ),
            (
                TrendlineParams {
                    scoring: ScoringParams {
                        proximity_weight: -0.1,
                        ..Default::default()
                    },
                    ..Default::default()
                },
                "scoring.proximity_weight",
            ),
            (
                TrendlineParams {
                    scoring: ScoringParams {
                        min_score: Some(f64::NAN),
                        ..Default::default()
                    },
                    ..Default::default()
                },
                "scoring.min_score",
            ),
        ];

        for (params, expected_field) in cases {
            match params.validate() {
                Err(TrendlineError::Config { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("expected config error for {}, got {:?}", expected_field, other),
            }
        }
    }
}
