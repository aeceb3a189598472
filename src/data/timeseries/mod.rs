pub mod series_file;

use crate::models::OhlcvTimeSeries;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct TimeSeriesCollection {
    pub name: String, // Metadata e.g. "Demo Series Collection"
    pub version: f64,
    pub series_data: Vec<OhlcvTimeSeries>,
}

impl TimeSeriesCollection {
    pub fn unique_symbols(&self) -> Vec<String> {
        // BTreeSet maintains sorted order and ensures uniqueness
        self.series_data
            .iter()
            .map(|ts| ts.symbol.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// First series for `symbol`, if any.
    pub fn find(&self, symbol: &str) -> Option<&OhlcvTimeSeries> {
        self.series_data.iter().find(|ts| ts.symbol == symbol)
    }
}
