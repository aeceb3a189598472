use serde::{Deserialize, Serialize};

/// Which side of the market a pivot (and any line fitted through it) belongs to.
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PivotKind {
    High, // Swing high, anchors resistance lines
    Low,  // Swing low, anchors support lines
}

/// A local price extremum relative to a symmetric window.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Pivot {
    /// Position of the bar in the full series (regression x coordinate)
    pub index: usize,
    pub timestamp_ms: i64,
    pub price: f64,
    pub kind: PivotKind,
}
