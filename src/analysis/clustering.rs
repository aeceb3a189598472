use std::collections::BTreeSet;

use crate::models::{CandidateLine, TrendlineCluster};

/// Merges equivalent candidate lines into representative clusters.
///
/// Greedy first-fit over `candidates` in the order given (lookback ascending,
/// then pair discovery order): a candidate joins the first cluster of the same
/// kind whose founding line is within `slope_tol` and `intercept_tol` of it,
/// otherwise it founds a new cluster. Tolerances are checked against the
/// founder only, so clusters never drift.
///
/// Representative stats are computed once all candidates are assigned:
/// mean slope / intercept / r², union of touches, summed violations.
/// Output is in cluster founding order; ranking happens later.
///
/// Feeding the output back in never splits a cluster, but two averaged lines
/// can end up within tolerance of each other and merge. Clusters whose founders
/// are more than three tolerances apart come back unchanged.
pub fn cluster_lines(
    candidates: &[CandidateLine],
    slope_tol: f64,
    intercept_tol: f64,
) -> Vec<TrendlineCluster> {
    // Member indices per cluster; the first entry is the founder
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (idx, candidate) in candidates.iter().enumerate() {
        let home = groups.iter_mut().find(|members| {
            let founder = &candidates[members[0]];
            founder.kind == candidate.kind
                && (candidate.slope - founder.slope).abs() <= slope_tol
                && (candidate.intercept - founder.intercept).abs() <= intercept_tol
        });
        match home {
            Some(members) => members.push(idx),
            None => groups.push(vec![idx]),
        }
    }

    let finalize_cluster = |members: &[usize]| {
        let founder = &candidates[members[0]];
        let count = members.len() as f64;

        let mut slope_sum = 0.0;
        let mut intercept_sum = 0.0;
        let mut r_squared_sum = 0.0;
        let mut touches = BTreeSet::new();
        let mut lookbacks = BTreeSet::new();
        let mut violation_count = 0;
        let mut start_index = founder.start_index();

        for line in members.iter().map(|&m| &candidates[m]) {
            slope_sum += line.slope;
            intercept_sum += line.intercept;
            r_squared_sum += line.r_squared;
            touches.extend(line.touches.iter().copied());
            lookbacks.insert(line.lookback);
            violation_count += line.violation_count;
            start_index = start_index.min(line.start_index());
        }

        TrendlineCluster {
            slope: slope_sum / count,
            intercept: intercept_sum / count,
            r_squared: r_squared_sum / count,
            touches,
            violation_count,
            lookback: founder.lookback,
            lookbacks,
            kind: founder.kind,
            member_count: members.len(),
            start_index,
            score: 0.0,
        }
    };

    groups.iter().map(|members| finalize_cluster(members)).collect()
}
