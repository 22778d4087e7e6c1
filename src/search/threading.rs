//! Shared control state for the exploration worker pool.
//!
//! The orchestrator and every worker hold the same `SharedRunState`. Whoever
//! first requests a stop decides the reason; later requests only keep the flag
//! raised. `CancellationToken` is the handle given to the operator side.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering},
    Arc,
};

/// Why a run stopped before exhausting its depth budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    SizeLimit,
    Fault,
}

impl StopReason {
    const fn code(self) -> u8 {
        match self {
            StopReason::Cancelled => 1,
            StopReason::SizeLimit => 2,
            StopReason::Fault => 3,
        }
    }

    const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(StopReason::Cancelled),
            2 => Some(StopReason::SizeLimit),
            3 => Some(StopReason::Fault),
            _ => None,
        }
    }
}

const NO_REASON: u8 = 0;

#[derive(Debug)]
pub struct SharedRunState {
    stop: AtomicBool,
    reason: AtomicU8,
    processed: AtomicU64,
    produced: AtomicU64,
}

impl SharedRunState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            stop: AtomicBool::new(false),
            reason: AtomicU8::new(NO_REASON),
            processed: AtomicU64::new(0),
            produced: AtomicU64::new(0),
        })
    }

    /// Raises the stop flag. Returns true if this call set the reason.
    #[inline]
    pub fn request_stop(&self, reason: StopReason) -> bool {
        let won = self
            .reason
            .compare_exchange(NO_REASON, reason.code(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        self.stop.store(true, Ordering::Release);
        won
    }

    #[inline]
    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    #[inline]
    pub fn stop_reason(&self) -> Option<StopReason> {
        StopReason::from_code(self.reason.load(Ordering::Acquire))
    }

    #[inline]
    pub fn add_processed(&self, n: u64) {
        self.processed.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_produced(&self, n: u64) {
        self.produced.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn produced(&self) -> u64 {
        self.produced.load(Ordering::Relaxed)
    }
}

/// Cloneable operator-side request to stop a run.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Folds an operator cancel into the shared state and reports whether to stop.
#[inline]
pub fn poll_stop(shared: &SharedRunState, cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        shared.request_stop(StopReason::Cancelled);
    }
    shared.should_stop()
}

/// Per-worker scratch state; never shared between threads.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    pub worker_id: usize,
    pub processed_local: u64,
    size_check_interval: usize,
    since_size_check: usize,
}

impl WorkerContext {
    pub fn new(worker_id: usize, size_check_interval: usize) -> Self {
        Self {
            worker_id,
            processed_local: 0,
            size_check_interval: size_check_interval.max(1),
            since_size_check: 0,
        }
    }

    /// Counts one item and returns true when a storage size check is due.
    #[inline]
    pub fn tick(&mut self) -> bool {
        self.since_size_check += 1;
        if self.since_size_check >= self.size_check_interval {
            self.since_size_check = 0;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn first_stop_reason_wins() {
        let shared = SharedRunState::new();
        assert!(!shared.should_stop());
        assert_eq!(shared.stop_reason(), None);

        assert!(shared.request_stop(StopReason::SizeLimit));
        assert!(!shared.request_stop(StopReason::Cancelled));
        assert!(shared.should_stop());
        assert_eq!(shared.stop_reason(), Some(StopReason::SizeLimit));
    }

    #[test]
    fn racing_stops_elect_exactly_one_reason() {
        let shared = SharedRunState::new();
        let winners: usize = thread::scope(|s| {
            let handles: Vec<_> = [StopReason::Cancelled, StopReason::SizeLimit, StopReason::Fault]
                .into_iter()
                .map(|reason| {
                    let shared = &shared;
                    s.spawn(move || shared.request_stop(reason) as usize)
                })
                .collect();
            handles.into_iter().map(|h| h.join().expect("join")).sum()
        });
        assert_eq!(winners, 1);
        assert!(shared.stop_reason().is_some());
    }

    #[test]
    fn cancellation_is_visible_through_clones() {
        let token = CancellationToken::new();
        let operator = token.clone();
        let shared = SharedRunState::new();

        assert!(!poll_stop(&shared, &token));
        operator.cancel();
        assert!(token.is_cancelled());
        assert!(poll_stop(&shared, &token));
        assert_eq!(shared.stop_reason(), Some(StopReason::Cancelled));
    }

    #[test]
    fn counters_accumulate() {
        let shared = SharedRunState::new();
        shared.add_processed(3);
        shared.add_processed(2);
        shared.add_produced(40);
        assert_eq!(shared.processed(), 5);
        assert_eq!(shared.produced(), 40);
    }

    #[test]
    fn worker_tick_fires_every_interval() {
        let mut ctx = WorkerContext::new(0, 3);
        let fired: Vec<bool> = (0..7).map(|_| ctx.tick()).collect();
        assert_eq!(fired, vec![false, false, true, false, false, true, false]);

        let mut every = WorkerContext::new(1, 0);
        assert!(every.tick());
        assert!(every.tick());
    }
}
