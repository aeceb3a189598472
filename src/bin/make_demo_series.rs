use anyhow::{Context, Result};
use trend_sniper::config::{DEMO, SERIES_VERSION};
use trend_sniper::data::{SeriesFile, TimeSeriesCollection};
use trend_sniper::{OhlcvTimeSeries, PricePoint};

fn main() -> Result<()> {
    build_demo_series()
}

fn build_demo_series() -> Result<()> {
    let mut collection = TimeSeriesCollection {
        name: "Demo Series Collection".to_string(),
        version: SERIES_VERSION,
        series_data: Vec::with_capacity(DEMO.symbols.len()),
    };

    for (k, symbol) in DEMO.symbols.iter().enumerate() {
        let points = synthetic_bars(k, DEMO.bars);
        let series = OhlcvTimeSeries::from_points(*symbol, &points)
            .with_context(|| format!("Generated an invalid series for {}", symbol))?;
        collection.series_data.push(series);
    }

    let output = SeriesFile::new(DEMO.interval_ms, collection, SERIES_VERSION);
    let output_path = SeriesFile::default_path(DEMO.interval_ms);
    output.save_to_path(&output_path, false)?;

    println!(
        "✅ Demo series written to {:?} with {} symbols x {} bars.",
        output_path,
        output.data.series_data.len(),
        DEMO.bars
    );
    Ok(())
}

// Drifting wave with periodic pullbacks onto a rising floor and rallies into a falling ceiling
fn synthetic_bars(k: usize, bars: usize) -> Vec<PricePoint> {
    let base = 100.0 * (k as f64 + 1.0);
    let drift = 0.002 * base;
    let amplitude = 0.04 * base;
    let period = 18.0 + 6.0 * k as f64;

    (0..bars)
        .map(|i| {
            let x = i as f64;
            let floor = base * 0.97 + drift * x;
            let wave = amplitude * (x * std::f64::consts::TAU / period).sin();
            // Deterministic jitter
            let jitter = 0.003 * base * ((x * 12.9898 + k as f64 * 78.233).sin());

            let close = (floor + amplitude + wave + jitter).max(floor);
            let open = close - jitter * 0.5;
            let high = open.max(close) + 0.004 * base;
            let low = (open.min(close) - 0.004 * base).max(floor);
            let volume = 1_000.0 + 250.0 * (x / 7.0).cos().abs();

            PricePoint::new(
                DEMO.first_timestamp_ms + i as i64 * DEMO.interval_ms,
                open,
                high,
                low,
                close,
                volume,
            )
        })
        .collect()
}
