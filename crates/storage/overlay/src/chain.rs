//! Copy-on-write session over the chain-state store.

use std::future::Future;

use evt_primitives::{AccountName, Bytes};
use evt_traits::{AccountRecord, ChainChangeSet, ChainDbRead, ChainDbWrite, EntryKey, StateDbError};

/// Exclusive mutation handle over a chain-state store.
///
/// Writes are buffered in a [`ChainChangeSet`] and never reach the base store
/// until [`ChainSession::commit`] is called. Reads see buffered writes first.
#[derive(Clone, Debug)]
pub struct ChainSession<S> {
    base: S,
    pending: ChainChangeSet,
}

impl<S> ChainSession<S> {
    /// Open an empty session on top of a base store.
    #[must_use]
    pub fn new(base: S) -> Self {
        Self { base, pending: ChainChangeSet::new() }
    }

    /// The underlying store.
    pub const fn base(&self) -> &S {
        &self.base
    }

    /// Buffered changes.
    pub const fn changes(&self) -> &ChainChangeSet {
        &self.pending
    }

    /// Whether any write has been buffered.
    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Create or replace an account record.
    pub fn set_account(&mut self, record: AccountRecord) {
        self.pending.accounts.insert(record.name, Some(record));
    }

    /// Remove an account.
    pub fn remove_account(&mut self, name: AccountName) {
        self.pending.accounts.insert(name, None);
    }

    /// Store an entry under an account scope.
    pub fn put(&mut self, scope: AccountName, key: Bytes, value: Bytes) {
        self.pending.entries.insert(EntryKey::new(scope, key), Some(value));
    }

    /// Delete an entry under an account scope.
    pub fn remove(&mut self, scope: AccountName, key: Bytes) {
        self.pending.entries.insert(EntryKey::new(scope, key), None);
    }

    /// Replace the active producer schedule.
    pub fn set_producers(&mut self, producers: Vec<AccountName>) {
        self.pending.producers = Some(producers);
    }

    /// Drop every buffered write.
    pub fn undo(&mut self) {
        self.pending = ChainChangeSet::new();
    }

    /// Consume the session, returning the buffered changes.
    pub fn into_changes(self) -> ChainChangeSet {
        self.pending
    }

    pub(crate) fn into_parts(self) -> (S, ChainChangeSet) {
        (self.base, self.pending)
    }
}

impl<S: ChainDbWrite> ChainSession<S> {
    /// Flush buffered changes into the base store.
    pub async fn commit(self) -> Result<(), StateDbError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.base.commit(self.pending).await
    }
}

impl<S: ChainDbRead> ChainDbRead for ChainSession<S> {
    fn account(
        &self,
        name: &AccountName,
    ) -> impl Future<Output = Result<Option<AccountRecord>, StateDbError>> + Send {
        let name = *name;
        let pending = self.pending.accounts.get(&name).cloned();
        let base = self.base.clone();
        async move {
            if let Some(record) = pending {
                return Ok(record);
            }
            base.account(&name).await
        }
    }

    fn active_producers(
        &self,
    ) -> impl Future<Output = Result<Vec<AccountName>, StateDbError>> + Send {
        let pending = self.pending.producers.clone();
        let base = self.base.clone();
        async move {
            if let Some(producers) = pending {
                return Ok(producers);
            }
            base.active_producers().await
        }
    }

    fn get(
        &self,
        scope: &AccountName,
        key: &Bytes,
    ) -> impl Future<Output = Result<Option<Bytes>, StateDbError>> + Send {
        let scope = *scope;
        let key = key.clone();
        let pending = self.pending.entries.get(&EntryKey::new(scope, key.clone())).cloned();
        let base = self.base.clone();
        async move {
            if let Some(value) = pending {
                return Ok(value);
            }
            base.get(&scope, &key).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MemoryChainDb, name};

    #[tokio::test]
    async fn reads_fall_through_to_base() {
        let base = MemoryChainDb::new().with_account(AccountRecord::new(name("alice")));
        let session = ChainSession::new(base);

        assert!(session.account(&name("alice")).await.unwrap().is_some());
        assert!(session.account(&name("bob")).await.unwrap().is_none());
        assert!(!session.is_dirty());
    }

    #[tokio::test]
    async fn pending_writes_shadow_base() {
        let base = MemoryChainDb::new().with_account(AccountRecord::new(name("alice")));
        let mut session = ChainSession::new(base.clone());

        session.remove_account(name("alice"));
        session.set_account(AccountRecord::new(name("bob")));
        session.put(name("bob"), Bytes::from_static(b"k"), Bytes::from_static(b"v"));

        assert!(session.account(&name("alice")).await.unwrap().is_none());
        assert!(session.account(&name("bob")).await.unwrap().is_some());
        assert_eq!(
            session.get(&name("bob"), &Bytes::from_static(b"k")).await.unwrap(),
            Some(Bytes::from_static(b"v"))
        );
        // base untouched
        assert!(base.account(&name("alice")).await.unwrap().is_some());
        assert!(base.account(&name("bob")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn producer_schedule_override_keeps_order() {
        let base = MemoryChainDb::new().with_producers(vec![name("bp1"), name("bp2")]);
        let mut session = ChainSession::new(base);
        assert_eq!(session.active_producers().await.unwrap(), vec![name("bp1"), name("bp2")]);

        session.set_producers(vec![name("bp3"), name("bp1")]);
        assert_eq!(session.active_producers().await.unwrap(), vec![name("bp3"), name("bp1")]);
    }

    #[tokio::test]
    async fn undo_discards_writes() {
        let mut session = ChainSession::new(MemoryChainDb::new());
        session.set_account(AccountRecord::new(name("carol")));
        assert!(session.is_dirty());

        session.undo();
        assert!(!session.is_dirty());
        assert!(session.account(&name("carol")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn commit_reaches_base() {
        let base = MemoryChainDb::new();
        let mut session = ChainSession::new(base.clone());
        session.set_account(AccountRecord::privileged(name("evt")));
        session.commit().await.unwrap();

        assert_eq!(
            base.account(&name("evt")).await.unwrap(),
            Some(AccountRecord::privileged(name("evt")))
        );
    }
}
