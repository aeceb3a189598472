use std::sync::Arc;

use crate::analysis::TrendlineAnalysis;
use crate::config::TrendlineParams;
use crate::models::OhlcvTimeSeries;

/// A request to run the trendline pipeline for one symbol
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub symbol: String,
    // Shared, immutable input series
    pub series: Arc<OhlcvTimeSeries>,
    pub params: TrendlineParams,
}

/// The result returned by the worker
#[derive(Debug, Clone)]
pub struct JobResult {
    pub symbol: String,
    pub duration_ms: u128,

    // Success: The new Front Buffer
    // Failure: The error string
    pub result: Result<Arc<TrendlineAnalysis>, String>,
}
