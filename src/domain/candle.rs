use serde::{Deserialize, Serialize};

/// One OHLCV bar as supplied by the upstream data provider.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PricePoint {
    // A constructor for convenience
    pub fn new(timestamp_ms: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        PricePoint {
            timestamp_ms,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }

    // Returns true if `price` lies inside the bar's low..high range widened by `slack`
    pub fn spans(&self, price: f64, slack: f64) -> bool {
        self.low - slack <= price && price <= self.high + slack
    }
}
