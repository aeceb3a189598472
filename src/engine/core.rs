use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};

use crate::analysis::TrendlineAnalysis;
use crate::config::TrendlineParams;
use crate::data::timeseries::TimeSeriesCollection;
use crate::models::OhlcvTimeSeries;

use super::messages::{JobRequest, JobResult};
use super::state::SymbolState;
use super::worker;

/// Runs the trendline pipeline per symbol on a background worker.
///
/// Jobs are queued by symbol and dispatched one at a time; finished analyses
/// land in each symbol's [`SymbolState`] front buffer on [`update`](Self::update).
pub struct TrendlineEngine {
    /// Registry of all symbols
    pub symbols: HashMap<String, SymbolState>,

    /// Shared immutable input, first series per symbol
    series: HashMap<String, Arc<OhlcvTimeSeries>>,

    /// Worker Communication
    job_tx: Sender<JobRequest>,
    result_rx: Receiver<JobResult>,

    /// Queue Logic
    pub queue: VecDeque<String>,

    /// Parameters used for the next dispatched job
    pub current_params: TrendlineParams,
}

impl TrendlineEngine {
    /// Initialize the engine and spawn the worker.
    pub fn new(timeseries: TimeSeriesCollection, params: TrendlineParams) -> Self {
        let (job_tx, job_rx) = channel::<JobRequest>();
        let (result_tx, result_rx) = channel::<JobResult>();

        worker::spawn_worker_thread(job_rx, result_tx);

        let mut series = HashMap::new();
        let mut symbols = HashMap::new();
        for ts in timeseries.series_data {
            if series.contains_key(&ts.symbol) {
                log::warn!("Duplicate series for {} ignored", ts.symbol);
                continue;
            }
            symbols.insert(ts.symbol.clone(), SymbolState::new());
            series.insert(ts.symbol.clone(), Arc::new(ts));
        }

        Self {
            symbols,
            series,
            job_tx,
            result_rx,
            queue: VecDeque::new(),
            current_params: params,
        }
    }

    /// Drains finished jobs and dispatches the next queued one.
    /// Returns TRUE while the engine is busy (queue not empty or a job running).
    pub fn update(&mut self) -> bool {
        // 1. Process Results (Swap Buffers)
        while let Ok(result) = self.result_rx.try_recv() {
            self.handle_job_result(result);
        }

        // 2. Dispatch Jobs
        self.process_queue();

        // 3. Report Busy Status
        self.is_busy()
    }

    /// Blocks until every queued and running job has finished.
    pub fn wait_all(&mut self) {
        while self.update() {
            if !self.has_active_workers() {
                continue;
            }
            match self.result_rx.recv() {
                Ok(result) => self.handle_job_result(result),
                Err(_) => {
                    // Worker is gone; nothing running can finish any more.
                    log::error!("Trendline worker stopped; abandoning {} queued jobs", self.queue.len());
                    self.queue.clear();
                    for state in self.symbols.values_mut().filter(|s| s.is_calculating) {
                        state.record_error("worker stopped".to_string(), 0);
                    }
                    return;
                }
            }
        }
    }

    /// Accessor for callers
    pub fn get_analysis(&self, symbol: &str) -> Option<Arc<TrendlineAnalysis>> {
        self.symbols
            .get(symbol)
            .and_then(|state| state.analysis.clone())
    }

    pub fn get_all_symbols(&self) -> Vec<String> {
        let mut names: Vec<String> = self.symbols.keys().cloned().collect();
        names.sort();
        names
    }

    // --- TELEMETRY ---

    pub fn get_queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn get_worker_status_msg(&self) -> Option<String> {
        let calculating = self
            .symbols
            .iter()
            .find(|(_, state)| state.is_calculating)
            .map(|(name, _)| name.clone());

        if let Some(symbol) = calculating {
            Some(format!("Processing {}", symbol))
        } else if !self.queue.is_empty() {
            Some(format!("Queued: {}", self.queue.len()))
        } else {
            None
        }
    }

    pub fn get_symbol_status(&self, symbol: &str) -> (bool, Option<String>) {
        if let Some(state) = self.symbols.get(symbol) {
            (state.is_calculating, state.last_error.clone())
        } else {
            (false, None)
        }
    }

    // --- CONFIG UPDATES ---

    pub fn update_params(&mut self, params: TrendlineParams) {
        self.current_params = params;
    }

    /// Clears the queue and queues every symbol, the priority one first.
    pub fn trigger_global_recalc(&mut self, priority_symbol: Option<String>) {
        self.queue.clear();

        let mut all_symbols = self.get_all_symbols();

        if let Some(vip) = priority_symbol {
            if let Some(pos) = all_symbols.iter().position(|s| s == &vip) {
                all_symbols.remove(pos);
                self.queue.push_back(vip);
            } else {
                log::warn!("Priority symbol {} is not loaded", vip);
            }
        }

        self.queue.extend(all_symbols);

        log::info!(
            "Global recalc: queue rebuilt ({} symbols). Head: {:?}",
            self.queue.len(),
            self.queue.front()
        );
    }

    /// Queue one symbol at the front, unless it is already queued or running.
    /// Returns false for unknown symbols.
    pub fn submit(&mut self, symbol: &str) -> bool {
        let Some(state) = self.symbols.get(symbol) else {
            log::warn!("Cannot submit {}: no series loaded", symbol);
            return false;
        };
        let in_queue = self.queue.iter().any(|s| s == symbol);

        if !state.is_calculating && !in_queue {
            self.queue.push_front(symbol.to_string());
        }
        true
    }

    // --- INTERNAL LOGIC ---

    fn is_busy(&self) -> bool {
        !self.queue.is_empty() || self.has_active_workers()
    }

    fn has_active_workers(&self) -> bool {
        self.symbols.values().any(|s| s.is_calculating)
    }

    fn handle_job_result(&mut self, result: JobResult) {
        if let Some(state) = self.symbols.get_mut(&result.symbol) {
            match result.result {
                Ok(analysis) => state.update_buffer(analysis, result.duration_ms),
                Err(e) => {
                    log::error!("Worker failed for {}: {}", result.symbol, e);
                    state.record_error(e, result.duration_ms);
                }
            }
        }
    }

    fn process_queue(&mut self) {
        // Single worker: one job in flight at a time
        if self.has_active_workers() {
            return;
        }
        if let Some(symbol) = self.queue.pop_front() {
            self.dispatch_job(symbol);
        }
    }

    fn dispatch_job(&mut self, symbol: String) {
        let (Some(state), Some(series)) = (self.symbols.get_mut(&symbol), self.series.get(&symbol))
        else {
            return;
        };

        let req = JobRequest {
            symbol,
            series: series.clone(),
            params: self.current_params.clone(),
        };

        if self.job_tx.send(req).is_ok() {
            state.is_calculating = true;
        } else {
            state.record_error("worker stopped".to_string(), 0);
        }
    }
}
