//! Async state store contracts.

use std::future::Future;

use evt_primitives::{AccountName, Bytes};

use crate::{AccountRecord, ChainChangeSet, StateDbError, TokenChangeSet, TokenKey};

/// Read access to generic chain state.
pub trait ChainDbRead: Clone + Send + Sync + 'static {
    /// Look up an account record. `Ok(None)` when the account does not exist.
    fn account(
        &self,
        name: &AccountName,
    ) -> impl Future<Output = Result<Option<AccountRecord>, StateDbError>> + Send;

    /// The active block-producer schedule, in schedule order.
    fn active_producers(
        &self,
    ) -> impl Future<Output = Result<Vec<AccountName>, StateDbError>> + Send;

    /// Read a key/value entry stored under an account scope.
    fn get(
        &self,
        scope: &AccountName,
        key: &Bytes,
    ) -> impl Future<Output = Result<Option<Bytes>, StateDbError>> + Send;
}

/// Write access to generic chain state.
pub trait ChainDbWrite: Clone + Send + Sync + 'static {
    /// Check that `changes` would be accepted, without applying anything.
    ///
    /// Called on both stores before either is committed.
    fn prepare(
        &self,
        _changes: &ChainChangeSet,
    ) -> impl Future<Output = Result<(), StateDbError>> + Send {
        async { Ok(()) }
    }

    /// Apply a change set atomically.
    fn commit(
        &self,
        changes: ChainChangeSet,
    ) -> impl Future<Output = Result<(), StateDbError>> + Send;
}

/// Combined chain-state store.
pub trait ChainDb: ChainDbRead + ChainDbWrite {}

impl<T: ChainDbRead + ChainDbWrite> ChainDb for T {}

/// Read access to the token ledger.
pub trait TokenDbRead: Clone + Send + Sync + 'static {
    /// Read a domain or token record.
    fn get(
        &self,
        key: &TokenKey,
    ) -> impl Future<Output = Result<Option<Bytes>, StateDbError>> + Send;
}

/// Write access to the token ledger.
pub trait TokenDbWrite: Clone + Send + Sync + 'static {
    /// Check that `changes` would be accepted, without applying anything.
    ///
    /// Called on both stores before either is committed.
    fn prepare(
        &self,
        _changes: &TokenChangeSet,
    ) -> impl Future<Output = Result<(), StateDbError>> + Send {
        async { Ok(()) }
    }

    /// Apply a change set atomically.
    fn commit(
        &self,
        changes: TokenChangeSet,
    ) -> impl Future<Output = Result<(), StateDbError>> + Send;
}

/// Combined token ledger.
pub trait TokenDb: TokenDbRead + TokenDbWrite {}

impl<T: TokenDbRead + TokenDbWrite> TokenDb for T {}
