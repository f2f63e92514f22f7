//! Blocking bridge from the async store contracts into synchronous execution.

use evt_overlay::{ChainSession, TokenSession};
use evt_primitives::{AccountName, Bytes};
use evt_traits::{AccountRecord, ChainDbRead, TokenDbRead, TokenKey};
use tracing::warn;

use crate::ApplyError;

/// Drive a store future to completion on the current thread.
pub(crate) fn block_on<F: std::future::Future>(f: F) -> F::Output {
    futures::executor::block_on(f)
}

/// Look up an account record, failing when it does not exist.
pub(crate) fn require_account<C: ChainDbRead>(
    chain: &ChainSession<C>,
    name: AccountName,
) -> Result<AccountRecord, ApplyError> {
    block_on(chain.account(&name))?.ok_or(ApplyError::AccountNotFound(name))
}

/// Existence check that never fails. Storage errors read as absent.
pub(crate) fn account_exists<C: ChainDbRead>(chain: &ChainSession<C>, name: AccountName) -> bool {
    match block_on(chain.account(&name)) {
        Ok(record) => record.is_some(),
        Err(err) => {
            warn!(account = %name, %err, "account lookup failed");
            false
        }
    }
}

pub(crate) fn active_producers<C: ChainDbRead>(
    chain: &ChainSession<C>,
) -> Result<Vec<AccountName>, ApplyError> {
    Ok(block_on(chain.active_producers())?)
}

pub(crate) fn read_entry<C: ChainDbRead>(
    chain: &ChainSession<C>,
    scope: AccountName,
    key: &Bytes,
) -> Result<Option<Bytes>, ApplyError> {
    Ok(block_on(chain.get(&scope, key))?)
}

pub(crate) fn read_token<T: TokenDbRead>(
    tokens: &TokenSession<T>,
    key: &TokenKey,
) -> Result<Option<Bytes>, ApplyError> {
    Ok(block_on(tokens.get(key))?)
}
