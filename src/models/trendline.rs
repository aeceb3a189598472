use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::pivot::{Pivot, PivotKind};

/// A line fitted through a pair of same-kind pivots.
///
/// `price = slope * index + intercept`, where `index` is the bar position in
/// the full series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateLine {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Bar timestamps within tolerance of the line (any bar, not only pivots)
    pub touches: BTreeSet<i64>,
    pub violation_count: usize,
    /// Pivot half-window this line was discovered with
    pub lookback: usize,
    pub kind: PivotKind,
    /// The two pivots the line was fitted through, earlier first
    pub anchors: (Pivot, Pivot),
}

impl CandidateLine {
    #[inline]
    pub fn project(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }

    pub fn touch_count(&self) -> usize {
        self.touches.len()
    }

    /// Index of the earlier anchor; the line does not exist before it.
    pub fn start_index(&self) -> usize {
        self.anchors.0.index
    }
}

/// Support/resistance hint attached to rendered lines.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineRole {
    Support,
    Resistance,
}

impl fmt::Display for LineRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LineRole::Support => write!(f, "support"),
            LineRole::Resistance => write!(f, "resistance"),
        }
    }
}

impl From<PivotKind> for LineRole {
    fn from(kind: PivotKind) -> Self {
        match kind {
            PivotKind::Low => LineRole::Support,
            PivotKind::High => LineRole::Resistance,
        }
    }
}

/// Averaged representative of one or more equivalent candidate lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendlineCluster {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Union of member touches
    pub touches: BTreeSet<i64>,
    /// Sum of member violations
    pub violation_count: usize,
    /// Lookback of the founding member
    pub lookback: usize,
    /// Every lookback that contributed a member
    pub lookbacks: BTreeSet<usize>,
    pub kind: PivotKind,
    pub member_count: usize,
    /// Earliest anchor index across members
    pub start_index: usize,
    /// Assigned by the ranker
    pub score: f64,
}

impl TrendlineCluster {
    #[inline]
    pub fn project(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }

    pub fn touch_count(&self) -> usize {
        self.touches.len()
    }

    pub fn first_touch(&self) -> Option<i64> {
        self.touches.first().copied()
    }

    pub fn last_touch(&self) -> Option<i64> {
        self.touches.last().copied()
    }

    /// Treat the representative as a single candidate (used to re-cluster output).
    pub fn as_candidate(&self) -> CandidateLine {
        let anchor = Pivot {
            index: self.start_index,
            timestamp_ms: self.first_touch().unwrap_or_default(),
            price: self.project(self.start_index),
            kind: self.kind,
        };
        CandidateLine {
            slope: self.slope,
            intercept: self.intercept,
            r_squared: self.r_squared,
            touches: self.touches.clone(),
            violation_count: self.violation_count,
            lookback: self.lookback,
            kind: self.kind,
            anchors: (anchor, anchor),
        }
    }
}
