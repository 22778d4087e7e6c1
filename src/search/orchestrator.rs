//! Level-synchronous breadth-first exploration over a pool of workers.
//!
//! Each depth runs as one or more passes. A pass cuts its frontier entries
//! into units of `batch_size`, feeds them through a bounded channel to scoped
//! worker threads and collects their reports until every worker has exited.
//! After the in-memory entries of a depth, the overflow entries of that depth
//! are drained in bounded batches, and only then does the frontier advance.
//!
//! Every worker owns its own store connection and commits its children in
//! whole transactions, so a stop at any point leaves a store with no dangling
//! edges.

use std::mem;
use std::thread;

use chrono::Utc;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use tracing::{debug, error, info, warn};

use crate::config::ExplorerConfig;
use crate::errors::ExploreError;
use crate::game_state::position::Position;
use crate::move_generation::move_generator::MoveGenerator;
use crate::search::frontier::{FrontierEntry, FrontierManager};
use crate::search::run_report::{DepthSummary, ExplorationObserver, Phase, RunOutcome, RunReport};
use crate::search::size_guard::SizeGuard;
use crate::search::threading::{
    poll_stop, CancellationToken, SharedRunState, StopReason, WorkerContext,
};
use crate::storage::state_store::{Expansion, StateStore, StoreHandle};

/// Explores every position reachable from `root` up to `config.max_depth` plies.
///
/// Only setup failures are returned as errors. Cancellation, storage pressure
/// and worker faults end the run early and are reported in the outcome.
pub fn explore<G: MoveGenerator + ?Sized>(
    store: &StateStore,
    root: &Position,
    config: &ExplorerConfig,
    cancel: &CancellationToken,
    generator: &G,
    observer: &dyn ExplorationObserver,
) -> Result<RunReport, ExploreError> {
    config.validate()?;
    let started_at = Utc::now();

    let mut handle = store.connect()?;
    let (root_id, inserted) = handle.intern_if_absent(root)?;
    let threads = config.normalized_threads();
    info!(
        root_id,
        new_root = inserted,
        max_depth = config.max_depth,
        threads,
        limit_bytes = config.size_limit_bytes(),
        "exploration starting"
    );

    let shared = SharedRunState::new();
    let ctx = PassContext {
        store,
        config,
        cancel,
        generator,
        observer,
        shared: &shared,
        guard: SizeGuard::from_config(config),
    };

    let mut run = Orchestrator::new(ctx, handle, threads);
    run.frontier.seed(FrontierEntry {
        state_id: root_id,
        depth: 0,
    });
    run.run_depths();
    Ok(run.finish(started_at))
}

/// Read-only pieces shared by the orchestrator and its workers.
struct PassContext<'a, G: ?Sized> {
    store: &'a StateStore,
    config: &'a ExplorerConfig,
    cancel: &'a CancellationToken,
    generator: &'a G,
    observer: &'a dyn ExplorationObserver,
    shared: &'a SharedRunState,
    guard: SizeGuard,
}

impl<G: ?Sized> Clone for PassContext<'_, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G: ?Sized> Copy for PassContext<'_, G> {}

impl<G: ?Sized> PassContext<'_, G> {
    #[inline]
    fn stopped(&self) -> bool {
        poll_stop(self.shared, self.cancel)
    }

    fn enter(&self, depth: u32, phase: Phase) {
        debug!(depth, ?phase, "phase");
    }
}

#[derive(Debug, Default)]
struct BatchReport {
    processed: u64,
    skipped: u64,
    discovered: Vec<FrontierEntry>,
}

enum WorkerMessage {
    Batch(BatchReport),
    Fault(String),
}

struct Orchestrator<'a, G: ?Sized> {
    ctx: PassContext<'a, G>,
    handle: StoreHandle,
    frontier: FrontierManager,
    threads: usize,
    fault: Option<String>,
    depths: Vec<DepthSummary>,
    deepest_closed_depth: u32,
}

impl<'a, G: MoveGenerator + ?Sized> Orchestrator<'a, G> {
    fn new(ctx: PassContext<'a, G>, handle: StoreHandle, threads: usize) -> Self {
        Self {
            frontier: FrontierManager::new(ctx.config.frontier_capacity, ctx.config.drain_batch),
            ctx,
            handle,
            threads: threads.max(1),
            fault: None,
            depths: Vec::new(),
            deepest_closed_depth: 0,
        }
    }

    fn run_depths(&mut self) {
        while self.frontier.depth() < self.ctx.config.max_depth {
            let depth = self.frontier.depth();
            let mut summary = DepthSummary {
                depth,
                ..DepthSummary::default()
            };

            let live = self.frontier.take_live();
            self.run_pass(live, &mut summary);
            if !self.ctx.stopped() {
                self.drain_overflow(&mut summary);
            }
            let closed = !self.ctx.stopped();

            info!(
                depth,
                processed = summary.processed,
                produced = summary.produced,
                spilled = summary.spilled,
                drained = summary.drained,
                skipped = summary.skipped,
                closed,
                "depth pass finished"
            );
            self.ctx.observer.on_depth_complete(&summary);
            self.depths.push(summary);
            if !closed {
                break;
            }

            self.ctx.enter(depth, Phase::Advancing);
            self.frontier.advance();
            if depth + 1 < self.ctx.config.max_depth && self.frontier_exhausted() {
                info!(depth, "no positions left to expand");
                self.deepest_closed_depth = depth;
                break;
            }
            self.deepest_closed_depth = depth + 1;
        }
    }

    /// True when the current depth has neither live nor spilled entries.
    ///
    /// Spills only happen once the live set is full, so an empty live set
    /// with pending overflow does not occur; the count is checked anyway.
    fn frontier_exhausted(&mut self) -> bool {
        if self.frontier.live_len() > 0 {
            return false;
        }
        let depth = self.frontier.depth();
        match self.handle.overflow_count(depth) {
            Ok(pending) => pending == 0,
            Err(e) => {
                self.record_fault(format!("overflow count failed at depth {depth}: {e}"));
                true
            }
        }
    }

    /// Pulls the spilled entries of the current depth back in bounded batches.
    ///
    /// A batch is acknowledged only once its pass ran to completion; after a
    /// stop its records stay in the overflow table.
    fn drain_overflow(&mut self, summary: &mut DepthSummary) {
        let depth = self.frontier.depth();
        self.ctx.enter(depth, Phase::Draining);

        loop {
            if self.ctx.stopped() {
                return;
            }
            let records = match self.frontier.drain_batch(&mut self.handle) {
                Ok(records) => records,
                Err(e) => {
                    self.record_fault(format!("overflow drain failed at depth {depth}: {e}"));
                    return;
                }
            };
            if records.is_empty() {
                return;
            }

            summary.drained += records.len() as u64;
            let entries = records.iter().map(|r| r.entry).collect();
            self.run_pass(entries, summary);
            if self.ctx.stopped() {
                return;
            }

            if let Err(e) = self.frontier.acknowledge(&mut self.handle, &records) {
                self.record_fault(format!("overflow acknowledge failed at depth {depth}: {e}"));
                return;
            }
        }
    }

    /// Expands `entries` across the worker pool and queues what they discover.
    fn run_pass(&mut self, entries: Vec<FrontierEntry>, summary: &mut DepthSummary) {
        if entries.is_empty() {
            return;
        }

        let ctx = self.ctx;
        let depth = summary.depth;
        let batch_size = ctx.config.batch_size;
        let max_depth = ctx.config.max_depth;
        let unit_count = entries.len().div_ceil(batch_size);
        let worker_count = self.threads.min(unit_count);

        ctx.enter(depth, Phase::Dispatching);
        let (work_tx, work_rx) = bounded::<Vec<FrontierEntry>>(worker_count * 2);
        let (result_tx, result_rx) = unbounded::<WorkerMessage>();

        let handle = &mut self.handle;
        let frontier = &mut self.frontier;
        let fault = &mut self.fault;

        let panicked = thread::scope(|s| {
            let workers: Vec<_> = (0..worker_count)
                .map(|worker_id| {
                    let worker = Worker {
                        ctx,
                        local: WorkerContext::new(worker_id, ctx.config.size_check_interval),
                    };
                    let work_rx = work_rx.clone();
                    let result_tx = result_tx.clone();
                    s.spawn(move || worker.run(work_rx, result_tx))
                })
                .collect();
            drop(work_rx);
            drop(result_tx);

            ctx.enter(depth, Phase::Expanding);
            for unit in entries.chunks(batch_size) {
                if ctx.stopped() || ctx.guard.check(handle, ctx.shared) {
                    break;
                }
                if work_tx.send(unit.to_vec()).is_err() {
                    break;
                }
            }
            drop(work_tx);

            ctx.enter(depth, Phase::Collecting);
            for message in result_rx.iter() {
                match message {
                    WorkerMessage::Batch(report) => {
                        summary.processed += report.processed;
                        summary.skipped += report.skipped;
                        summary.produced += report.discovered.len() as u64;

                        let retained: Vec<FrontierEntry> = report
                            .discovered
                            .into_iter()
                            .filter(|entry| entry.depth < max_depth)
                            .collect();
                        if retained.is_empty() {
                            continue;
                        }
                        match frontier.accept_next(handle, retained) {
                            Ok(spilled) => summary.spilled += spilled as u64,
                            Err(e) => record_fault(
                                fault,
                                ctx.shared,
                                format!("frontier spill failed at depth {depth}: {e}"),
                            ),
                        }
                    }
                    WorkerMessage::Fault(message) => record_fault(fault, ctx.shared, message),
                }
            }

            workers
                .into_iter()
                .map(|worker| worker.join())
                .filter(Result::is_err)
                .count()
        });

        if panicked > 0 {
            self.record_fault(format!("{panicked} worker thread(s) panicked at depth {depth}"));
        }
    }

    fn record_fault(&mut self, message: String) {
        record_fault(&mut self.fault, self.ctx.shared, message);
    }

    fn finish(mut self, started_at: chrono::DateTime<Utc>) -> RunReport {
        let outcome = RunOutcome::from_stop(self.ctx.shared.stop_reason(), self.fault.take());

        let total_states = self.handle.state_count().unwrap_or_else(|e| {
            warn!(error = %e, "could not count states");
            0
        });
        let total_edges = self.handle.edge_count().unwrap_or_else(|e| {
            warn!(error = %e, "could not count edges");
            0
        });
        let dangling_edges = self.handle.dangling_edge_count().unwrap_or_else(|e| {
            warn!(error = %e, "could not check edge integrity");
            0
        });
        if dangling_edges > 0 {
            error!(dangling_edges, "edges reference missing states");
        } else {
            info!(dangling_edges, "edge integrity verified");
        }

        info!(
            outcome = ?outcome,
            deepest_closed_depth = self.deepest_closed_depth,
            total_states,
            total_edges,
            processed = self.ctx.shared.processed(),
            produced = self.ctx.shared.produced(),
            "exploration finished"
        );

        RunReport {
            outcome,
            deepest_closed_depth: self.deepest_closed_depth,
            depths: mem::take(&mut self.depths),
            total_states,
            total_edges,
            dangling_edges,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

fn record_fault(slot: &mut Option<String>, shared: &SharedRunState, message: String) {
    error!(%message, "exploration fault");
    shared.request_stop(StopReason::Fault);
    slot.get_or_insert(message);
}

struct Worker<'a, G: ?Sized> {
    ctx: PassContext<'a, G>,
    local: WorkerContext,
}

impl<G: MoveGenerator + ?Sized> Worker<'_, G> {
    fn run(mut self, work_rx: Receiver<Vec<FrontierEntry>>, result_tx: Sender<WorkerMessage>) {
        let mut handle = match self.ctx.store.connect() {
            Ok(handle) => handle,
            Err(e) => {
                self.ctx.shared.request_stop(StopReason::Fault);
                let _ = result_tx.send(WorkerMessage::Fault(format!(
                    "worker {} could not connect: {e}",
                    self.local.worker_id
                )));
                return;
            }
        };

        for unit in work_rx.iter() {
            let report = self.expand_unit(&mut handle, unit);
            if result_tx.send(WorkerMessage::Batch(report)).is_err() {
                return;
            }
        }
        debug!(
            worker = self.local.worker_id,
            processed = self.local.processed_local,
            "worker done"
        );
    }

    fn expand_unit(&mut self, handle: &mut StoreHandle, unit: Vec<FrontierEntry>) -> BatchReport {
        let ctx = self.ctx;
        let mut report = BatchReport::default();
        let mut pending: Vec<Expansion> = Vec::new();
        let mut pending_rows = 0usize;

        for entry in unit {
            if ctx.stopped() {
                break;
            }
            if self.local.tick() && ctx.guard.check(handle, ctx.shared) {
                break;
            }

            let position = match handle.fetch(entry.state_id) {
                Ok(position) => position,
                Err(e) => {
                    warn!(
                        worker = self.local.worker_id,
                        state_id = entry.state_id,
                        error = %e,
                        "skipping frontier entry"
                    );
                    report.skipped += 1;
                    continue;
                }
            };

            let children = ctx.generator.successors(&position);
            pending_rows += children.len();
            pending.push(Expansion {
                parent: entry.state_id,
                child_depth: entry.depth + 1,
                children,
            });
            report.processed += 1;

            if pending_rows >= ctx.config.flush_rows {
                self.flush(handle, &mut pending, &mut report);
                pending_rows = 0;
            }
        }
        self.flush(handle, &mut pending, &mut report);

        self.local.processed_local += report.processed;
        ctx.shared.add_processed(report.processed);
        report
    }

    fn flush(&self, handle: &mut StoreHandle, pending: &mut Vec<Expansion>, report: &mut BatchReport) {
        if pending.is_empty() {
            return;
        }
        let batch = mem::take(pending);

        match handle.flush_expansions(&batch) {
            Ok(outcome) => {
                report.skipped += outcome.rows_skipped as u64;
                self.ctx.shared.add_produced(outcome.discovered.len() as u64);
                self.ctx.observer.on_batch_committed(&outcome);
                report.discovered.extend(outcome.discovered);
            }
            Err(e) => {
                warn!(
                    worker = self.local.worker_id,
                    parents = batch.len(),
                    error = %e,
                    "flush failed; dropping batch"
                );
                report.processed = report.processed.saturating_sub(batch.len() as u64);
                report.skipped += batch.len() as u64;
            }
        }
    }
}
