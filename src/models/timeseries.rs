use serde::{Deserialize, Serialize};

use crate::config::params::PivotSource;
use crate::domain::candle::PricePoint;
use crate::domain::pivot::PivotKind;
use crate::error::{Result, Stage, TrendlineError};

// ============================================================================
// OhlcvTimeSeries: Raw time series data for one symbol
// ============================================================================

/// Columnar OHLCV series ordered by strictly ascending timestamp.
///
/// Regression coordinates use the bar position (`index`), never the raw epoch.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct OhlcvTimeSeries {
    pub symbol: String,
    /// Nominal bar width, informational only (0 when unknown)
    #[serde(default)]
    pub interval_ms: i64,

    pub timestamps_ms: Vec<i64>,

    // Prices
    pub open_prices: Vec<f64>,
    pub high_prices: Vec<f64>,
    pub low_prices: Vec<f64>,
    pub close_prices: Vec<f64>,

    pub volumes: Vec<f64>,
}

impl OhlcvTimeSeries {
    /// Build a series from row-oriented bars and validate it.
    pub fn from_points(symbol: impl Into<String>, points: &[PricePoint]) -> Result<Self> {
        let series = OhlcvTimeSeries {
            symbol: symbol.into(),
            interval_ms: infer_interval_ms(points),
            timestamps_ms: points.iter().map(|p| p.timestamp_ms).collect(),
            open_prices: points.iter().map(|p| p.open).collect(),
            high_prices: points.iter().map(|p| p.high).collect(),
            low_prices: points.iter().map(|p| p.low).collect(),
            close_prices: points.iter().map(|p| p.close).collect(),
            volumes: points.iter().map(|p| p.volume).collect(),
        };
        series.validate()?;
        Ok(series)
    }

    /// Reject empty, misaligned, unordered or non-finite data.
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| -> Result<()> {
            Err(TrendlineError::validation(Stage::SeriesValidation, reason))
        };

        let len = self.timestamps_ms.len();
        if len == 0 {
            return fail(format!("series '{}' is empty", self.symbol));
        }

        let columns = [
            ("open_prices", self.open_prices.len()),
            ("high_prices", self.high_prices.len()),
            ("low_prices", self.low_prices.len()),
            ("close_prices", self.close_prices.len()),
            ("volumes", self.volumes.len()),
        ];
        if let Some((name, col_len)) = columns.iter().find(|(_, col_len)| *col_len != len) {
            return fail(format!(
                "series '{}': column {} has {} values but there are {} timestamps",
                self.symbol, name, col_len, len
            ));
        }

        if let Some(idx) = self
            .timestamps_ms
            .windows(2)
            .position(|pair| pair[1] <= pair[0])
        {
            return fail(format!(
                "series '{}': timestamps must be strictly ascending, bar {} ({}) follows bar {} ({})",
                self.symbol,
                idx + 1,
                self.timestamps_ms[idx + 1],
                idx,
                self.timestamps_ms[idx]
            ));
        }

        for idx in 0..len {
            let bar = self.get_point(idx);
            if !bar.is_finite() {
                return fail(format!(
                    "series '{}': bar {} (ts {}) has a non-finite price or volume",
                    self.symbol, idx, bar.timestamp_ms
                ));
            }
            if bar.high < bar.low {
                return fail(format!(
                    "series '{}': bar {} (ts {}) has high {} below low {}",
                    self.symbol, idx, bar.timestamp_ms, bar.high, bar.low
                ));
            }
        }

        Ok(())
    }

    pub fn get_point(&self, idx: usize) -> PricePoint {
        PricePoint::new(
            self.timestamps_ms[idx],
            self.open_prices[idx],
            self.high_prices[idx],
            self.low_prices[idx],
            self.close_prices[idx],
            self.volumes[idx],
        )
    }

    pub fn points(&self) -> Vec<PricePoint> {
        (0..self.len()).map(|idx| self.get_point(idx)).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.timestamps_ms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.timestamps_ms.is_empty()
    }

    /// Position of a bar timestamp in the series.
    pub fn index_of(&self, timestamp_ms: i64) -> Option<usize> {
        self.timestamps_ms.binary_search(&timestamp_ms).ok()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.close_prices.last().copied()
    }

    /// Price column used to detect pivots of `kind`.
    pub fn pivot_prices(&self, kind: PivotKind, source: PivotSource) -> &[f64] {
        match (source, kind) {
            (PivotSource::Close, _) => &self.close_prices,
            (PivotSource::HighLow, PivotKind::High) => &self.high_prices,
            (PivotSource::HighLow, PivotKind::Low) => &self.low_prices,
        }
    }
}

// Most common gap between consecutive bars; 0 when it cannot be told
fn infer_interval_ms(points: &[PricePoint]) -> i64 {
    use std::collections::BTreeMap;

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    // Runs before validation, so timestamps may be unordered or extreme
    for gap in points
        .windows(2)
        .filter_map(|pair| pair[1].timestamp_ms.checked_sub(pair[0].timestamp_ms))
    {
        *counts.entry(gap).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(gap, _)| gap)
        .filter(|gap| *gap > 0)
        .unwrap_or(0)
}
