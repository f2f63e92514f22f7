//! Combined mutation scope over both stores.

use evt_traits::{
    ChainChangeSet, ChainDb, ChainDbRead, StateDbError, TokenChangeSet, TokenDbWrite,
};
use tracing::{debug, error, warn};

use crate::{ChainSession, TokenSession};

/// The pair of exclusive mutation handles for one transaction.
///
/// Both sessions are committed or discarded together; neither base store
/// observes a write until [`StateScope::commit`].
#[derive(Clone, Debug)]
pub struct StateScope<C, T> {
    chain: ChainSession<C>,
    tokens: TokenSession<T>,
}

impl<C, T> StateScope<C, T> {
    /// Open a scope over a chain-state store and a token ledger.
    #[must_use]
    pub fn new(chain: C, tokens: T) -> Self {
        Self { chain: ChainSession::new(chain), tokens: TokenSession::new(tokens) }
    }

    /// The chain-state session.
    pub const fn chain(&self) -> &ChainSession<C> {
        &self.chain
    }

    /// The token-ledger session.
    pub const fn tokens(&self) -> &TokenSession<T> {
        &self.tokens
    }

    /// Borrow both sessions mutably at once.
    pub const fn sessions_mut(&mut self) -> (&mut ChainSession<C>, &mut TokenSession<T>) {
        (&mut self.chain, &mut self.tokens)
    }

    /// Whether either session holds buffered writes.
    pub fn is_dirty(&self) -> bool {
        self.chain.is_dirty() || self.tokens.is_dirty()
    }

    /// Discard every buffered write in both sessions.
    pub fn rollback(self) {
        debug!(
            chain_dirty = self.chain.is_dirty(),
            ledger_records = self.tokens.changes().len(),
            "rolling back state scope"
        );
    }

    /// Consume the scope, returning both change sets without touching the stores.
    pub fn into_changes(self) -> (ChainChangeSet, TokenChangeSet) {
        (self.chain.into_changes(), self.tokens.into_changes())
    }
}

impl<C: ChainDb, T: TokenDbWrite> StateScope<C, T> {
    /// Commit both sessions.
    ///
    /// Both stores must accept their change set in [`evt_traits::ChainDbWrite::prepare`]
    /// and [`TokenDbWrite::prepare`] before either is written. The chain store
    /// is written first. If the ledger then fails its commit, the chain store
    /// is restored from the pre-image taken before the write, and the ledger
    /// error is returned.
    pub async fn commit(self) -> Result<(), StateDbError> {
        let (chain, chain_changes) = self.chain.into_parts();
        let (tokens, token_changes) = self.tokens.into_parts();
        if chain_changes.is_empty() && token_changes.is_empty() {
            return Ok(());
        }
        debug!(
            accounts = chain_changes.accounts.len(),
            entries = chain_changes.entries.len(),
            ledger_records = token_changes.len(),
            "committing state scope"
        );

        if !chain_changes.is_empty() {
            chain.prepare(&chain_changes).await?;
        }
        if !token_changes.is_empty() {
            tokens.prepare(&token_changes).await?;
        }

        if token_changes.is_empty() {
            return chain.commit(chain_changes).await;
        }
        if chain_changes.is_empty() {
            return tokens.commit(token_changes).await;
        }

        let undo = pre_image(&chain, &chain_changes).await?;
        chain.commit(chain_changes).await?;
        if let Err(err) = tokens.commit(token_changes).await {
            warn!(error = %err, "ledger commit failed, restoring chain state");
            if let Err(restore) = chain.commit(undo).await {
                error!(error = %restore, "failed to restore chain state");
            }
            return Err(err);
        }
        Ok(())
    }
}

/// Read the current base values of every key `changes` touches.
async fn pre_image<C: ChainDbRead>(
    chain: &C,
    changes: &ChainChangeSet,
) -> Result<ChainChangeSet, StateDbError> {
    let mut undo = ChainChangeSet::new();
    for name in changes.accounts.keys() {
        undo.accounts.insert(*name, chain.account(name).await?);
    }
    for key in changes.entries.keys() {
        undo.entries.insert(key.clone(), chain.get(&key.scope, &key.key).await?);
    }
    if changes.producers.is_some() {
        undo.producers = Some(chain.active_producers().await?);
    }
    Ok(undo)
}
