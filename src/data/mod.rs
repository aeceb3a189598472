// Series loading and saving (JSON)
pub mod timeseries;

// Re-export commonly used types
pub use timeseries::TimeSeriesCollection;
pub use timeseries::series_file::{SeriesFile, load_collection};
