// Domain models for trendline analysis
// These modules contain pure data independent of rendering

pub mod overlay;
pub mod timeseries;
pub mod trendline;

// Re-export key types for convenience
pub use overlay::{OverlayDescriptor, OverlayPoint};
pub use timeseries::OhlcvTimeSeries;
pub use trendline::{CandidateLine, LineRole, TrendlineCluster};
