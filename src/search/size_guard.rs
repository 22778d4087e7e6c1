//! Storage-size backpressure.

use tracing::{info, warn};

use crate::config::ExplorerConfig;
use crate::errors::StoreResult;
use crate::search::threading::{SharedRunState, StopReason};
use crate::storage::state_store::StoreHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeGuard {
    limit_bytes: u64,
}

impl SizeGuard {
    pub fn new(max_bytes: u64, threshold: f64) -> Self {
        Self {
            limit_bytes: (max_bytes as f64 * threshold) as u64,
        }
    }

    pub fn from_config(config: &ExplorerConfig) -> Self {
        Self {
            limit_bytes: config.size_limit_bytes(),
        }
    }

    #[inline]
    pub fn limit_bytes(&self) -> u64 {
        self.limit_bytes
    }

    pub fn exceeded(&self, handle: &mut StoreHandle) -> StoreResult<bool> {
        Ok(handle.storage_size()? >= self.limit_bytes)
    }

    /// Stops the run once the store reaches the limit.
    ///
    /// A failed size query is logged and treated as "not exceeded".
    pub fn check(&self, handle: &mut StoreHandle, shared: &SharedRunState) -> bool {
        match self.exceeded(handle) {
            Ok(true) => {
                if shared.request_stop(StopReason::SizeLimit) {
                    info!(limit_bytes = self.limit_bytes, "storage limit reached; stopping");
                }
                true
            }
            Ok(false) => false,
            Err(e) => {
                warn!(error = %e, "storage size check failed");
                false
            }
        }
    }
}
