//! File persistence and serialization configuration

/// Directory path for storing series collections
pub const SERIES_PATH: &str = "series_data";

/// Base filename for series files (without extension)
pub const SERIES_FILENAME_WITHOUT_EXT: &str = "series";

/// Current version of the series collection format
pub const SERIES_VERSION: f64 = 1.0;

use crate::utils::TimeUtils;

/// Generate interval-specific series filename
/// Example: "series_1d_v1.json"
pub fn series_filename(interval_ms: i64) -> String {
    let interval_str = TimeUtils::interval_to_string(interval_ms);
    format!(
        "{}_{}_v{}.json",
        SERIES_FILENAME_WITHOUT_EXT, interval_str, SERIES_VERSION
    )
}
