// Trendline detection stages, in pipeline order
pub mod pivots;
pub mod line_fitting;
pub mod touches;
pub mod clustering;
pub mod ranking;

// End-to-end orchestration over all lookbacks
pub mod pipeline;

// Re-export commonly used types
pub use clustering::cluster_lines;
pub use line_fitting::fit_lines;
pub use pipeline::{LookbackStats, PipelineStats, TrendlineAnalysis, detect_trendlines, run_pipeline};
pub use pivots::find_pivots;
pub use ranking::rank_and_select;
pub use touches::count_touches;
