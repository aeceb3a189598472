use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::Instant;

use crate::analysis::run_pipeline;
#[cfg(debug_assertions)]
use crate::analysis::TrendlineAnalysis;
#[cfg(debug_assertions)]
use crate::config::{PRINT_ENGINE_JOBS, PRINT_OVERLAYS, PRINT_PIPELINE_SUMMARY};
#[cfg(debug_assertions)]
use crate::utils::time_utils::epoch_ms_to_utc;

use super::messages::{JobRequest, JobResult};

pub fn spawn_worker_thread(rx: Receiver<JobRequest>, tx: Sender<JobResult>) {
    thread::spawn(move || {
        while let Ok(req) = rx.recv() {
            let start = Instant::now();

            // The heavy calculation (pure function of series + params)
            let result = run_pipeline(&req.series, &req.params);

            let elapsed = start.elapsed().as_millis();

            #[cfg(debug_assertions)]
            log_job(&req.symbol, elapsed, &result);

            let reply = JobResult {
                symbol: req.symbol,
                duration_ms: elapsed,
                result: result.map(Arc::new).map_err(|e| e.to_string()),
            };

            // Receiver gone means the engine was dropped; nothing left to do.
            if tx.send(reply).is_err() {
                break;
            }
        }
    });
}

#[cfg(debug_assertions)]
fn log_job(symbol: &str, elapsed_ms: u128, result: &crate::error::Result<TrendlineAnalysis>) {
    let analysis = match result {
        Ok(analysis) => analysis,
        Err(e) => {
            if PRINT_ENGINE_JOBS {
                log::warn!("[{}] Job failed after {}ms: {}", symbol, elapsed_ms, e);
            }
            return;
        }
    };

    if PRINT_ENGINE_JOBS {
        log::info!(
            "[{}] Job done in {}ms: {} bars -> {} lines ({} clusters)",
            symbol,
            elapsed_ms,
            analysis.stats.bars,
            analysis.overlays.len(),
            analysis.stats.clusters
        );
    }

    if PRINT_PIPELINE_SUMMARY {
        for stats in &analysis.stats.lookbacks {
            log::info!(
                "   ↪ lookback {}: {} highs, {} lows, {} candidates, {} kept",
                stats.lookback,
                stats.high_pivots,
                stats.low_pivots,
                stats.candidates,
                stats.kept
            );
        }
    }

    if PRINT_OVERLAYS {
        for (rank, overlay) in analysis.overlays.iter().enumerate() {
            log::info!(
                "   #{} {} score {:.3} | {} @ {:.4} -> {} @ {:.4} | {} touches",
                rank + 1,
                overlay.role_hint,
                overlay.score,
                epoch_ms_to_utc(overlay.start.timestamp_ms),
                overlay.start.price,
                epoch_ms_to_utc(overlay.end.timestamp_ms),
                overlay.end.price,
                overlay.touches.len()
            );
        }
    }
}
