//! Copy-on-write session over the token ledger.

use std::future::Future;

use evt_primitives::Bytes;
use evt_traits::{StateDbError, TokenChangeSet, TokenDbRead, TokenDbWrite, TokenKey};

/// Exclusive mutation handle over a token ledger.
#[derive(Clone, Debug)]
pub struct TokenSession<S> {
    base: S,
    pending: TokenChangeSet,
}

impl<S> TokenSession<S> {
    /// Open an empty session on top of a base ledger.
    #[must_use]
    pub fn new(base: S) -> Self {
        Self { base, pending: TokenChangeSet::new() }
    }

    /// The underlying ledger.
    pub const fn base(&self) -> &S {
        &self.base
    }

    /// Buffered changes.
    pub const fn changes(&self) -> &TokenChangeSet {
        &self.pending
    }

    /// Whether any write has been buffered.
    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Write a domain or token record.
    pub fn put(&mut self, key: TokenKey, value: Bytes) {
        self.pending.entries.insert(key, Some(value));
    }

    /// Delete a domain or token record.
    pub fn remove(&mut self, key: TokenKey) {
        self.pending.entries.insert(key, None);
    }

    /// Drop every buffered write.
    pub fn undo(&mut self) {
        self.pending = TokenChangeSet::new();
    }

    /// Consume the session, returning the buffered changes.
    pub fn into_changes(self) -> TokenChangeSet {
        self.pending
    }

    pub(crate) fn into_parts(self) -> (S, TokenChangeSet) {
        (self.base, self.pending)
    }
}

impl<S: TokenDbRead> TokenSession<S> {
    /// Whether a record exists, taking buffered writes into account.
    pub async fn exists(&self, key: &TokenKey) -> Result<bool, StateDbError> {
        Ok(self.get(key).await?.is_some())
    }
}

impl<S: TokenDbWrite> TokenSession<S> {
    /// Flush buffered changes into the base ledger.
    pub async fn commit(self) -> Result<(), StateDbError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.base.commit(self.pending).await
    }
}

impl<S: TokenDbRead> TokenDbRead for TokenSession<S> {
    fn get(
        &self,
        key: &TokenKey,
    ) -> impl Future<Output = Result<Option<Bytes>, StateDbError>> + Send {
        let key = *key;
        let pending = self.pending.entries.get(&key).cloned();
        let base = self.base.clone();
        async move {
            if let Some(value) = pending {
                return Ok(value);
            }
            base.get(&key).await
        }
    }
}
