//! Run configuration for the state-space explorer.

use std::path::PathBuf;
use std::thread;

use crate::errors::ConfigError;

pub const DEFAULT_MAX_STORAGE_MB: u64 = 1024;
const BYTES_PER_MB: u64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerConfig {
    pub db_path: PathBuf,
    /// Plies to expand from the root; depth `max_depth` entries are never expanded.
    pub max_depth: u32,
    /// Live frontier entries kept in memory per depth before spilling.
    pub frontier_capacity: usize,
    /// Overflow records pulled back per drain round.
    pub drain_batch: usize,
    /// Frontier entries per work unit handed to a worker.
    pub batch_size: usize,
    /// Worker count; 0 means one per available hardware thread.
    pub worker_threads: usize,
    pub max_storage_bytes: u64,
    /// Fraction of `max_storage_bytes` at which the run stops.
    pub size_threshold: f64,
    /// Items a worker expands between two storage-size checks.
    pub size_check_interval: usize,
    /// Child rows a worker buffers before committing a flush.
    pub flush_rows: usize,
    pub busy_timeout_ms: u64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("statespace.db"),
            max_depth: 3,
            frontier_capacity: 10_000,
            drain_batch: 10_000,
            batch_size: 100,
            worker_threads: 0,
            max_storage_bytes: DEFAULT_MAX_STORAGE_MB * BYTES_PER_MB,
            size_threshold: 0.9,
            size_check_interval: 32,
            flush_rows: 512,
            busy_timeout_ms: 30_000,
        }
    }
}

impl ExplorerConfig {
    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_frontier_capacity(mut self, capacity: usize) -> Self {
        self.frontier_capacity = capacity;
        self.drain_batch = capacity;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    pub fn with_max_storage_bytes(mut self, bytes: u64) -> Self {
        self.max_storage_bytes = bytes;
        self
    }

    pub fn with_max_storage_mb(self, mb: u64) -> Self {
        self.with_max_storage_bytes(mb.saturating_mul(BYTES_PER_MB))
    }

    pub fn with_size_threshold(mut self, threshold: f64) -> Self {
        self.size_threshold = threshold;
        self
    }

    pub fn with_size_check_interval(mut self, items: usize) -> Self {
        self.size_check_interval = items;
        self
    }

    pub fn with_flush_rows(mut self, rows: usize) -> Self {
        self.flush_rows = rows;
        self
    }

    /// Worker count with `0` resolved to the available hardware parallelism.
    pub fn normalized_threads(&self) -> usize {
        if self.worker_threads > 0 {
            return self.worker_threads;
        }
        thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// Storage size at which the backpressure guard trips.
    pub fn size_limit_bytes(&self) -> u64 {
        (self.max_storage_bytes as f64 * self.size_threshold) as u64
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("frontier_capacity", self.frontier_capacity),
            ("drain_batch", self.drain_batch),
            ("batch_size", self.batch_size),
            ("size_check_interval", self.size_check_interval),
            ("flush_rows", self.flush_rows),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Zero(*name));
        }
        if self.max_storage_bytes == 0 {
            return Err(ConfigError::Zero("max_storage_bytes"));
        }
        if !(self.size_threshold > 0.0 && self.size_threshold <= 1.0) {
            return Err(ConfigError::Threshold(self.size_threshold));
        }
        Ok(())
    }
}

/// Parses an operator-entered storage size in MB, falling back to the default.
///
/// Returns the size and whether the fallback was used.
pub fn parse_storage_mb(input: &str) -> (u64, bool) {
    match input.trim().parse::<u64>() {
        Ok(mb) if mb > 0 => (mb, false),
        _ => (DEFAULT_MAX_STORAGE_MB, true),
    }
}
