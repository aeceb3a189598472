use std::cmp::Ordering;

use colorgrad::Gradient;

use crate::config::OVERLAY_CONFIG;
use crate::config::params::{RightEdge, RolePolicy, ScoreMode, ScoringParams};
use crate::models::{LineRole, OhlcvTimeSeries, OverlayDescriptor, OverlayPoint, TrendlineCluster};
use crate::utils::maths_utils::{normalize_min_max, relative_distance};

/// Composite score for one cluster. Higher is better.
///
/// `RSquared` mode uses the mean r² alone. `Weighted` mode blends r², touch count
/// (saturating at `touch_norm`) and recency of the last touch, then subtracts the
/// share of bars since the line started that broke it and the relative distance
/// (capped at 1) between the last close and the line at the last bar.
pub fn score_cluster(
    cluster: &TrendlineCluster,
    scoring: &ScoringParams,
    series: &OhlcvTimeSeries,
) -> f64 {
    match scoring.mode {
        ScoreMode::RSquared => cluster.r_squared,
        ScoreMode::Weighted => {
            let touch_term = (cluster.touch_count() as f64 / scoring.touch_norm).min(1.0);

            let last_bar = series.len().saturating_sub(1);
            let recency = match cluster.last_touch().and_then(|ts| series.index_of(ts)) {
                Some(_) if last_bar == 0 => 1.0,
                Some(idx) => idx as f64 / last_bar as f64,
                None => 0.0,
            };

            // Violations are summed over members, so normalise per member as well
            let live_bars = series.len().saturating_sub(cluster.start_index).max(1);
            let violation_ratio = (cluster.violation_count as f64
                / (live_bars * cluster.member_count.max(1)) as f64)
                .min(1.0);

            let proximity = series
                .last_close()
                .map(|close| relative_distance(cluster.project(last_bar), close).min(1.0))
                .unwrap_or(0.0);

            scoring.r_squared_weight * cluster.r_squared
                + scoring.touches_weight * touch_term
                + scoring.recency_weight * recency
                - scoring.violation_weight * violation_ratio
                - scoring.proximity_weight * proximity
        }
    }
}

pub fn assign_scores(
    clusters: &mut [TrendlineCluster],
    scoring: &ScoringParams,
    series: &OhlcvTimeSeries,
) {
    for cluster in clusters.iter_mut() {
        cluster.score = score_cluster(cluster, scoring, series);
    }
}

/// Best first: score descending, then more touches, then smaller lookback.
pub fn rank_order(a: &TrendlineCluster, b: &TrendlineCluster) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.touch_count().cmp(&a.touch_count()))
        .then_with(|| a.lookback.cmp(&b.lookback))
}

/// Drops clusters scoring below `min_score`, sorts the rest with [`rank_order`]
/// and keeps the first `top_n`. The sort is stable, so full ties keep their
/// clustering order.
pub fn rank_and_select(
    mut clusters: Vec<TrendlineCluster>,
    min_score: Option<f64>,
    top_n: Option<usize>,
) -> Vec<TrendlineCluster> {
    if let Some(min_score) = min_score {
        clusters.retain(|cluster| cluster.score >= min_score);
    }
    clusters.sort_by(rank_order);
    if let Some(n) = top_n {
        clusters.truncate(n);
    }
    clusters
}

fn hex_string(color: &colorgrad::Color) -> String {
    let [r, g, b, _] = color.to_rgba8();
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

fn role_for(cluster: &TrendlineCluster, series: &OhlcvTimeSeries, policy: RolePolicy) -> LineRole {
    match policy {
        RolePolicy::PivotKind => LineRole::from(cluster.kind),
        RolePolicy::PricePosition => {
            let last_idx = series.len().saturating_sub(1);
            match series.last_close() {
                Some(close) if close >= cluster.project(last_idx) => LineRole::Support,
                Some(_) => LineRole::Resistance,
                None => LineRole::from(cluster.kind),
            }
        }
    }
}

/// Turns ranked clusters into renderer-facing segments, keeping the ranking order.
///
/// Each segment starts at the cluster's earliest touch and ends at its last
/// touch or at the last bar of the series. Prices are the cluster line
/// projected at those bars. Clusters without touches are skipped.
pub fn build_overlays(
    ranked: &[TrendlineCluster],
    series: &OhlcvTimeSeries,
    right_edge: RightEdge,
    role_policy: RolePolicy,
) -> Vec<OverlayDescriptor> {
    let scores: Vec<f64> = ranked.iter().map(|c| c.score).collect();
    let relative_scores = normalize_min_max(&scores);

    let gradient = colorgrad::GradientBuilder::new()
        .html_colors(OVERLAY_CONFIG.score_gradient_colors)
        .build::<colorgrad::CatmullRomGradient>()
        .ok();

    ranked
        .iter()
        .zip(relative_scores)
        .filter_map(|(cluster, relative)| {
            let start_idx = cluster.first_touch().and_then(|ts| series.index_of(ts))?;
            let end_idx = match right_edge {
                RightEdge::LastTouch => cluster.last_touch().and_then(|ts| series.index_of(ts))?,
                RightEdge::ChartEdge => series.len().checked_sub(1)?,
            };

            let role_hint = role_for(cluster, series, role_policy);
            let color = match role_hint {
                LineRole::Support => OVERLAY_CONFIG.support_color,
                LineRole::Resistance => OVERLAY_CONFIG.resistance_color,
            };
            let score_color = gradient
                .as_ref()
                .map(|g| hex_string(&g.at(relative as f32)))
                .unwrap_or_else(|| color.to_string());

            Some(OverlayDescriptor {
                start: OverlayPoint {
                    timestamp_ms: series.timestamps_ms[start_idx],
                    price: cluster.project(start_idx),
                },
                end: OverlayPoint {
                    timestamp_ms: series.timestamps_ms[end_idx],
                    price: cluster.project(end_idx),
                },
                score: cluster.score,
                touches: cluster.touches.iter().copied().collect(),
                role_hint,
                kind: cluster.kind,
                slope: cluster.slope,
                intercept: cluster.intercept,
                lookback: cluster.lookback,
                violation_count: cluster.violation_count,
                color: color.to_string(),
                score_color,
            })
        })
        .collect()
}
