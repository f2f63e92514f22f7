//! Error types for state store operations.

use thiserror::Error;

/// Error type for chain-state and token-ledger operations.
#[derive(Debug, Error)]
pub enum StateDbError {
    /// Lock was poisoned.
    #[error("lock poisoned")]
    LockPoisoned,

    /// A commit was rejected by the backing store.
    #[error("commit rejected: {0}")]
    CommitRejected(String),
}
