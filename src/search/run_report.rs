//! Run phases, outcomes and the per-depth report.

use chrono::{DateTime, Utc};

use crate::search::threading::StopReason;
use crate::storage::state_store::FlushOutcome;

/// Step of a depth pass, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Dispatching,
    Expanding,
    Collecting,
    Draining,
    Advancing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Cancelled,
    SizeLimited,
    Failed(String),
}

impl RunOutcome {
    pub fn from_stop(reason: Option<StopReason>, fault: Option<String>) -> Self {
        if let Some(message) = fault {
            return RunOutcome::Failed(message);
        }
        match reason {
            None => RunOutcome::Completed,
            Some(StopReason::Cancelled) => RunOutcome::Cancelled,
            Some(StopReason::SizeLimit) => RunOutcome::SizeLimited,
            Some(StopReason::Fault) => RunOutcome::Failed("worker fault".to_owned()),
        }
    }

    /// Operator-facing explanation of why the run ended.
    pub fn describe(&self) -> String {
        match self {
            RunOutcome::Completed => "reached the maximum depth".to_owned(),
            RunOutcome::Cancelled => "cancelled by the operator".to_owned(),
            RunOutcome::SizeLimited => "storage limit reached".to_owned(),
            RunOutcome::Failed(message) => format!("failed: {message}"),
        }
    }
}

/// Counters for one depth pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepthSummary {
    pub depth: u32,
    /// Frontier entries expanded.
    pub processed: u64,
    /// States stored for the first time one ply deeper.
    pub produced: u64,
    /// New entries written to the overflow table.
    pub spilled: u64,
    /// Overflow entries pulled back for this depth.
    pub drained: u64,
    /// Entries or rows that failed and were skipped.
    pub skipped: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Every state at this distance from the root or closer is stored.
    pub deepest_closed_depth: u32,
    pub depths: Vec<DepthSummary>,
    pub total_states: u64,
    pub total_edges: u64,
    pub dangling_edges: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// Progress callbacks. `on_batch_committed` runs on worker threads.
pub trait ExplorationObserver: Sync {
    fn on_depth_complete(&self, _summary: &DepthSummary) {}

    fn on_batch_committed(&self, _outcome: &FlushOutcome) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ExplorationObserver for NoopObserver {}
