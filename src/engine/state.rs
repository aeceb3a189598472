use crate::analysis::TrendlineAnalysis;
use std::sync::Arc;
use std::time::Instant;

/// Represents the state of a single symbol in the engine.
#[derive(Debug, Clone, Default)]
pub struct SymbolState {
    /// Front buffer: the latest finished analysis.
    /// Readers clone the Arc; a new result replaces the pointer.
    pub analysis: Option<Arc<TrendlineAnalysis>>,

    pub last_update_time: Option<Instant>,
    pub last_duration_ms: u128,

    /// Is the worker currently crunching this symbol?
    pub is_calculating: bool,

    /// Last error (if any)
    pub last_error: Option<String>,
}

impl SymbolState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Promotes a finished result to the front buffer.
    pub fn update_buffer(&mut self, analysis: Arc<TrendlineAnalysis>, duration_ms: u128) {
        self.analysis = Some(analysis);
        self.is_calculating = false;
        self.last_update_time = Some(Instant::now());
        self.last_duration_ms = duration_ms;
        self.last_error = None;
    }

    /// Records a failed run. The previous analysis (if any) stays readable.
    pub fn record_error(&mut self, error: String, duration_ms: u128) {
        self.is_calculating = false;
        self.last_duration_ms = duration_ms;
        self.last_error = Some(error);
    }
}
