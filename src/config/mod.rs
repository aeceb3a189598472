//! Configuration module for the trendline engine.

pub mod analysis;

mod debug; // Private: files use crate::config::PRINT_* not crate::config::debug::PRINT_*
pub use debug::{PRINT_ENGINE_JOBS, PRINT_OVERLAYS, PRINT_PIPELINE_SUMMARY, PRINT_SERDE};

pub mod demo;
pub mod params;
pub mod persistence;
pub mod plot;

// Re-export commonly used items
pub use analysis::TRENDLINE;
pub use demo::DEMO;
pub use params::{
    PivotSource, ReferencePrice, RightEdge, RolePolicy, ScoreMode, ScoringParams,
    TrendlineParams, ViolationRule,
};
pub use persistence::{SERIES_PATH, SERIES_VERSION, series_filename};
pub use plot::OVERLAY_CONFIG;
