//! Synthetic demo series knobs used by the `make_demo_series` helper.

use crate::utils::TimeUtils;

pub struct DemoConfig {
    /// Symbols written to the demo collection
    pub symbols: &'static [&'static str],
    /// Bars per symbol
    pub bars: usize,
    pub interval_ms: i64,
    /// Timestamp of the first bar (2024-01-01T00:00:00Z)
    pub first_timestamp_ms: i64,
}

pub const DEMO: DemoConfig = DemoConfig {
    symbols: &["BTCUSDT", "ETHUSDT", "SOLUSDT"],
    bars: 250,
    interval_ms: TimeUtils::MS_IN_D,
    first_timestamp_ms: 1_704_067_200_000,
};
