use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[cfg(debug_assertions)]
use crate::config::PRINT_SERDE;
use crate::config::{SERIES_PATH, SERIES_VERSION, series_filename};
use crate::data::timeseries::TimeSeriesCollection;
use crate::domain::candle::PricePoint;
use crate::models::OhlcvTimeSeries;

/// Serialized wrapper around a collection, written by `make_demo_series`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SeriesFile {
    pub version: f64,
    pub timestamp_ms: i64,
    pub interval_ms: i64,
    pub data: TimeSeriesCollection,
}

impl SeriesFile {
    pub fn new(interval_ms: i64, data: TimeSeriesCollection, version: f64) -> Self {
        Self {
            version,
            timestamp_ms: Utc::now().timestamp_millis(),
            interval_ms,
            data,
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).context(format!("Failed to open series file: {:?}", path))?;
        let reader = BufReader::new(file);
        let series_file = serde_json::from_reader(reader)
            .context(format!("Failed to deserialize series file: {:?}", path))?;
        Ok(series_file)
    }

    pub fn save_to_path(&self, path: &Path, pretty: bool) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }
        let file =
            File::create(path).context(format!("Failed to create file: {}", path.display()))?;
        let writer = BufWriter::new(file);
        let written = if pretty {
            serde_json::to_writer_pretty(writer, self)
        } else {
            serde_json::to_writer(writer, self)
        };
        written.context(format!("Failed to serialize series to: {}", path.display()))
    }

    pub fn default_path(interval_ms: i64) -> PathBuf {
        PathBuf::from(SERIES_PATH).join(series_filename(interval_ms))
    }
}

/// Accepted input layouts: a full series file, a bare collection, or one symbol's bars.
#[derive(Deserialize)]
#[serde(untagged)]
enum SeriesDocument {
    File(SeriesFile),
    Collection(TimeSeriesCollection),
    Bars(Vec<PricePoint>),
}

/// Loads and validates every series in a JSON document.
///
/// A bare list of bars becomes a one-series collection named after the file stem.
pub fn load_collection(path: &Path) -> Result<TimeSeriesCollection> {
    let file = File::open(path).context(format!("Failed to open series file: {:?}", path))?;
    let document: SeriesDocument = serde_json::from_reader(BufReader::new(file))
        .context(format!("Failed to deserialize series file: {:?}", path))?;

    let collection = match document {
        SeriesDocument::File(series_file) => {
            if series_file.version > SERIES_VERSION {
                bail!(
                    "Series file version mismatch: file v{} is newer than supported v{}",
                    series_file.version,
                    SERIES_VERSION
                );
            }
            series_file.data
        }
        SeriesDocument::Collection(collection) => collection,
        SeriesDocument::Bars(points) => {
            let symbol = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let series = OhlcvTimeSeries::from_points(symbol, &points)
                .context(format!("Invalid bars in {:?}", path))?;
            TimeSeriesCollection {
                name: path.display().to_string(),
                version: SERIES_VERSION,
                series_data: vec![series],
            }
        }
    };

    for series in &collection.series_data {
        series
            .validate()
            .context(format!("Invalid series '{}' in {:?}", series.symbol, path))?;
    }

    #[cfg(debug_assertions)]
    if PRINT_SERDE {
        log::info!(
            "Loaded {} series ({}) from {:?}",
            collection.series_data.len(),
            collection.unique_symbols().join(", "),
            path
        );
    }

    Ok(collection)
}
