//! Apply error types.

use std::fmt;

use evt_primitives::{AccountName, DomainKey, DomainName, Name};
use evt_traits::StateDbError;
use thiserror::Error;

/// Which notification bound was hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotifyLimit {
    /// Nesting depth of notified contexts.
    Depth,
    /// Distinct receivers under one top-level action.
    Breadth,
}

impl fmt::Display for NotifyLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Depth => f.write_str("depth"),
            Self::Breadth => f.write_str("breadth"),
        }
    }
}

/// Errors that abort the application of an action.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// A required domain/key pair is not among the declared authorizations.
    #[error("missing authorization {domain}/{key}")]
    AuthorizationFailure {
        /// Protected domain.
        domain: DomainName,
        /// Required key.
        key: DomainKey,
    },

    /// Declared authorizations do not reach a permission's threshold.
    #[error("permission {permission} not satisfied: weight {weight}, threshold {threshold}")]
    InsufficientAuthority {
        /// Permission name.
        permission: Name,
        /// Weight contributed by declared authorizations.
        weight: u32,
        /// Required weight.
        threshold: u32,
    },

    /// A non-privileged receiver attempted a privileged operation.
    #[error("account {0} is not privileged")]
    PrivilegeViolation(AccountName),

    /// An account required to exist does not.
    #[error("account not found: {0}")]
    AccountNotFound(AccountName),

    /// A notification bound was exceeded.
    #[error("notification {limit} limit exceeded: {value} > {max}")]
    RecursionLimitExceeded {
        /// The bound that was hit.
        limit: NotifyLimit,
        /// Attempted value.
        value: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Caller buffer cannot hold the requested encoding.
    #[error("buffer too small: {required} bytes required, {available} available")]
    BufferTooSmall {
        /// Bytes needed.
        required: usize,
        /// Bytes offered.
        available: usize,
    },

    /// No action of the given kind at the given index.
    #[error("no action of kind {kind} at index {index}")]
    ActionIndexOutOfRange {
        /// Requested action kind.
        kind: u32,
        /// Requested index.
        index: u32,
    },

    /// The invoked handler failed.
    #[error("handler failed: {0}")]
    HandlerFailure(String),

    /// The packed transaction exceeds the configured size.
    #[error("transaction too large: {size} > {max} bytes")]
    TransactionTooLarge {
        /// Packed size.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The processing deadline passed.
    #[error("transaction deadline exceeded")]
    DeadlineExceeded,

    /// State store error.
    #[error("state error: {0}")]
    State(#[from] StateDbError),
}

impl ApplyError {
    /// Build a [`ApplyError::HandlerFailure`].
    pub fn handler(reason: impl Into<String>) -> Self {
        Self::HandlerFailure(reason.into())
    }
}
