#![allow(clippy::collapsible_if)]
#![allow(clippy::type_complexity)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod models;
pub mod utils;

// The batch engine (caller side of the pipeline)
pub mod engine;

// Re-export commonly used types
pub use analysis::{TrendlineAnalysis, detect_trendlines, run_pipeline};
pub use config::TrendlineParams;
pub use data::{SeriesFile, TimeSeriesCollection, load_collection};
pub use domain::{Pivot, PivotKind, PricePoint};
pub use engine::TrendlineEngine;
pub use error::{Result, TrendlineError};
pub use models::{CandidateLine, LineRole, OhlcvTimeSeries, OverlayDescriptor, TrendlineCluster};

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};

// CLI argument parsing
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Series JSON (series file, collection, or a bare list of bars).
    /// Defaults to the file written by make_demo_series
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Parameter JSON; omitted keys keep their defaults
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Only analyse this symbol
    #[arg(long)]
    pub symbol: Option<String>,

    /// Override pivot lookbacks, e.g. 5,10
    #[arg(long, value_delimiter = ',')]
    pub lookbacks: Option<Vec<usize>>,

    /// Keep only the best N lines per symbol
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Write overlays here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

impl Cli {
    pub fn input_path(&self) -> PathBuf {
        self.input
            .clone()
            .unwrap_or_else(|| SeriesFile::default_path(config::DEMO.interval_ms))
    }

    /// Params file (or defaults) with command-line overrides applied, validated.
    pub fn resolve_params(&self) -> anyhow::Result<TrendlineParams> {
        let mut params = match &self.params {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .context(format!("Failed to read params file: {}", path.display()))?;
                TrendlineParams::from_json(&text)
                    .context(format!("Failed to parse params file: {}", path.display()))?
            }
            None => TrendlineParams::default(),
        };

        if let Some(lookbacks) = &self.lookbacks {
            params.lookbacks = lookbacks.clone();
        }
        if self.top_n.is_some() {
            params.top_n = self.top_n;
        }

        params.validate()?;
        Ok(params)
    }
}

/// Runs every symbol (or just `symbol`) through the engine and waits for all results.
/// Returns the finished analyses keyed by symbol; any failed job fails the batch.
pub fn run_batch(
    collection: TimeSeriesCollection,
    params: TrendlineParams,
    symbol: Option<&str>,
) -> anyhow::Result<BTreeMap<String, Arc<TrendlineAnalysis>>> {
    let mut engine = TrendlineEngine::new(collection, params);

    let symbols = match symbol {
        Some(symbol) => {
            if !engine.submit(symbol) {
                bail!(
                    "Symbol {} not found (available: {})",
                    symbol,
                    engine.get_all_symbols().join(", ")
                );
            }
            vec![symbol.to_string()]
        }
        None => {
            engine.trigger_global_recalc(None);
            engine.get_all_symbols()
        }
    };
    engine.wait_all();

    let mut results = BTreeMap::new();
    for symbol in symbols {
        match engine.get_analysis(&symbol) {
            Some(analysis) => {
                results.insert(symbol, analysis);
            }
            None => {
                let (_, error) = engine.get_symbol_status(&symbol);
                bail!(
                    "Analysis failed for {}: {}",
                    symbol,
                    error.unwrap_or_else(|| "no result".to_string())
                );
            }
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timeseries::test_support::*;

    #[test]
    fn cli_overrides_params() {
        let cli = Cli::parse_from([
            "trend-sniper",
            "--input",
            "bars.json",
            "--lookbacks",
            "10,5",
            "--top-n",
            "3",
            "--pretty",
        ]);
        assert_eq!(cli.input_path(), PathBuf::from("bars.json"));
        assert!(cli.pretty);

        let params = cli.resolve_params().unwrap();
        assert_eq!(params.lookbacks, vec![10, 5]);
        assert_eq!(params.top_n, Some(3));
        assert_eq!(params.min_touches, TrendlineParams::default().min_touches);
    }

    #[test]
    fn cli_rejects_invalid_overrides() {
        let cli = Cli::parse_from(["trend-sniper", "--lookbacks", "0"]);
        assert!(cli.resolve_params().is_err());
        assert_eq!(cli.input_path(), SeriesFile::default_path(config::DEMO.interval_ms));
    }

    #[test]
    fn batch_covers_requested_symbols() {
        let mut series = uptrend_with_two_swing_lows();
        series.symbol = "BTCUSDT".to_string();
        let collection = TimeSeriesCollection {
            name: "test".to_string(),
            version: 1.0,
            series_data: vec![series],
        };
        let params = TrendlineParams {
            min_touches: 2,
            ..TrendlineParams::default()
        };

        let results = run_batch(collection.clone(), params.clone(), None).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results["BTCUSDT"].overlays.len(), 1);

        assert!(run_batch(collection.clone(), params.clone(), Some("BTCUSDT")).is_ok());
        assert!(run_batch(collection, params, Some("ETHUSDT")).is_err());
    }
}
