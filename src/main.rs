use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;

use trend_sniper::utils::time_utils::epoch_ms_to_utc;
use trend_sniper::{Cli, OverlayDescriptor, load_collection, run_batch};

fn main() -> Result<()> {
    // A. Init Logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    // C. Inputs
    let params = args.resolve_params()?;
    let input = args.input_path();
    let collection = load_collection(&input)
        .with_context(|| format!("Failed to load series from {:?}", input))?;
    log::info!(
        "Loaded {} series from {:?} (lookbacks {:?}, min touches {})",
        collection.series_data.len(),
        input,
        params.sorted_lookbacks(),
        params.min_touches
    );

    // D. Run
    let results = run_batch(collection, params, args.symbol.as_deref())?;

    let mut overlays: BTreeMap<String, Vec<OverlayDescriptor>> = BTreeMap::new();
    for (symbol, analysis) in &results {
        log::info!(
            "{}: {} lines from {} candidates over {} bars",
            symbol,
            analysis.overlays.len(),
            analysis.stats.total_candidates(),
            analysis.stats.bars
        );
        if let Some(best) = analysis.overlays.first() {
            log::info!(
                "{}: best {} line {} -> {} (score {:.3}, {} touches)",
                symbol,
                best.role_hint,
                epoch_ms_to_utc(best.start.timestamp_ms),
                epoch_ms_to_utc(best.end.timestamp_ms),
                best.score,
                best.touches.len()
            );
        }
        overlays.insert(symbol.clone(), analysis.overlays.clone());
    }

    // E. Output
    let json = if args.pretty {
        serde_json::to_string_pretty(&overlays)
    } else {
        serde_json::to_string(&overlays)
    }
    .context("Failed to serialize overlays")?;

    match &args.output {
        Some(path) => {
            let file =
                File::create(path).context(format!("Failed to create file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            writeln!(writer, "{}", json)
                .context(format!("Failed to write overlays to: {}", path.display()))?;
            log::info!("✅ Overlays written to {:?}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
