//! Analysis and computation configuration

/// Pivot detection defaults
pub struct PivotSettings {
    // Half-width (in bars) of the pivot window
    pub lookback: usize,
    // Fractional price distance below which a new pivot duplicates an accepted one.
    // 0.0 disables de-duplication
    pub dedupe_pct: f64,
}

/// Line fitting and touch counting defaults
pub struct LineSettings {
    // Relative distance between price and line that still counts as a touch
    pub touch_tolerance_pct: f64,
    pub min_touches: usize,
    // How far beyond a line price must close before it counts as a violation
    pub break_tolerance_pct: f64,
    pub min_pair_span_bars: usize,
}

/// Clustering defaults. Both tolerances are absolute (price per bar, price units).
pub struct ClusterSettings {
    pub slope_tolerance: f64,
    pub intercept_tolerance: f64,
}

/// Composite score weights
pub struct ScoreSettings {
    pub r_squared_weight: f64,
    pub touches_weight: f64,
    pub recency_weight: f64,
    pub violation_weight: f64,
    // Penalty per unit of relative distance between the last close and the line
    pub proximity_weight: f64,
    // Touch count that earns the full touches weight
    pub touch_norm: f64,
}

/// The Master Trendline Configuration
pub struct TrendlineDefaults {
    pub pivots: PivotSettings,
    pub lines: LineSettings,
    pub clusters: ClusterSettings,
    pub score: ScoreSettings,
}

pub const TRENDLINE: TrendlineDefaults = TrendlineDefaults {
    pivots: PivotSettings {
        lookback: 5,
        dedupe_pct: 0.0,
    },

    lines: LineSettings {
        touch_tolerance_pct: 0.005,
        min_touches: 3,
        break_tolerance_pct: 0.0015,
        min_pair_span_bars: 1,
    },

    clusters: ClusterSettings {
        slope_tolerance: 0.05,
        intercept_tolerance: 1.0,
    },

    score: ScoreSettings {
        r_squared_weight: 0.4,
        touches_weight: 0.4,
        recency_weight: 0.2,
        violation_weight: 0.5,
        proximity_weight: 0.0,
        touch_norm: 10.0,
    },
};
