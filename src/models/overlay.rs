use serde::{Deserialize, Serialize};

use crate::domain::pivot::PivotKind;
use crate::models::trendline::LineRole;

/// A `(timestamp, price)` end of a rendered segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayPoint {
    pub timestamp_ms: i64,
    pub price: f64,
}

/// Renderer-facing description of one ranked trendline.
///
/// Pixel mapping, legend and final colouring policy belong to the renderer;
/// `color` and `score_color` are hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayDescriptor {
    pub start: OverlayPoint,
    pub end: OverlayPoint,
    pub score: f64,
    pub touches: Vec<i64>,
    pub role_hint: LineRole,

    pub kind: PivotKind,
    pub slope: f64,
    pub intercept: f64,
    pub lookback: usize,
    pub violation_count: usize,
    /// Role colour (hex)
    pub color: String,
    /// Colour on the score gradient, relative to the other overlays (hex)
    pub score_color: String,
}
