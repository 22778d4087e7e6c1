//! Error types used throughout the state-space explorer.
//!
//! Per-item failures (`StoreError` on a single fetch or insert) are logged and
//! skipped by the workers that hit them. Only setup failures surface through
//! `ExploreError`; storage pressure and cancellation are run outcomes, not errors.

use thiserror::Error;

use crate::storage::state_store::StateId;

/// Failure to decode a canonical position key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("encoded position must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid piece tag {tag} on square {square}")]
    InvalidPieceTag { square: u8, tag: u8 },

    #[error("invalid side-to-move byte {0}")]
    InvalidSideToMove(u8),
}

/// FEN parse failure with the offending detail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("missing {0} field in FEN")]
    MissingField(&'static str),

    #[error("board layout must contain 8 ranks, got {0}")]
    RankCount(usize),

    #[error("rank {rank} does not sum to 8 files")]
    RankWidth { rank: usize },

    #[error("invalid character '{0}' in board layout")]
    InvalidPiece(char),

    #[error("invalid side-to-move field: {0}")]
    InvalidSideToMove(String),
}

/// Persistence-layer failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot open state database: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("state database query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("state {0} not found")]
    NotFound(StateId),

    #[error("state database holds no states")]
    Empty,

    #[error("stored position is corrupt: {0}")]
    Encoding(#[from] EncodingError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Rejected explorer configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("size threshold must be in (0, 1], got {0}")]
    Threshold(f64),
}

/// Errors that abort a run before any expansion begins.
#[derive(Debug, Error)]
pub enum ExploreError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("store setup failed: {0}")]
    Setup(#[from] StoreError),
}
