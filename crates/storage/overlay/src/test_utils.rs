//! In-memory stores for tests.

use std::{
    collections::BTreeMap,
    future::Future,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicBool, Ordering},
    },
};

use evt_primitives::{AccountName, Bytes, Name};
use evt_traits::{
    AccountRecord, ChainChangeSet, ChainDbRead, ChainDbWrite, EntryKey, StateDbError,
    TokenChangeSet, TokenDbRead, TokenDbWrite, TokenKey,
};

/// Parse a name literal.
///
/// # Panics
///
/// Panics when `s` is not a valid name.
pub fn name(s: &str) -> Name {
    s.parse().unwrap_or_else(|err| panic!("invalid name literal {s:?}: {err}"))
}

#[derive(Debug, Default)]
struct ChainInner {
    accounts: BTreeMap<AccountName, AccountRecord>,
    entries: BTreeMap<EntryKey, Bytes>,
    producers: Vec<AccountName>,
}

/// Chain-state store backed by shared in-memory maps.
///
/// Clones share the same state.
#[derive(Clone, Debug, Default)]
pub struct MemoryChainDb {
    inner: Arc<RwLock<ChainInner>>,
}

impl MemoryChainDb {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account.
    #[must_use]
    pub fn with_account(self, record: AccountRecord) -> Self {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .accounts
            .insert(record.name, record);
        self
    }

    /// Seed the producer schedule.
    #[must_use]
    pub fn with_producers(self, producers: Vec<AccountName>) -> Self {
        self.inner.write().unwrap_or_else(PoisonError::into_inner).producers = producers;
        self
    }

    /// Seed a scoped entry.
    #[must_use]
    pub fn with_entry(self, scope: AccountName, key: Bytes, value: Bytes) -> Self {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .insert(EntryKey::new(scope, key), value);
        self
    }

    /// Committed account record.
    pub fn account_record(&self, name: AccountName) -> Option<AccountRecord> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).accounts.get(&name).cloned()
    }

    /// Committed entry.
    pub fn entry(&self, scope: AccountName, key: &'static [u8]) -> Option<Bytes> {
        let key = EntryKey::new(scope, Bytes::from_static(key));
        self.inner.read().unwrap_or_else(PoisonError::into_inner).entries.get(&key).cloned()
    }

    /// Committed producer schedule.
    pub fn producers(&self) -> Vec<AccountName> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).producers.clone()
    }
}

impl ChainDbRead for MemoryChainDb {
    fn account(
        &self,
        name: &AccountName,
    ) -> impl Future<Output = Result<Option<AccountRecord>, StateDbError>> + Send {
        let record = self
            .inner
            .read()
            .map(|inner| inner.accounts.get(name).cloned())
            .map_err(|_| StateDbError::LockPoisoned);
        async move { record }
    }

    fn active_producers(
        &self,
    ) -> impl Future<Output = Result<Vec<AccountName>, StateDbError>> + Send {
        let producers = self
            .inner
            .read()
            .map(|inner| inner.producers.clone())
            .map_err(|_| StateDbError::LockPoisoned);
        async move { producers }
    }

    fn get(
        &self,
        scope: &AccountName,
        key: &Bytes,
    ) -> impl Future<Output = Result<Option<Bytes>, StateDbError>> + Send {
        let key = EntryKey::new(*scope, key.clone());
        let value = self
            .inner
            .read()
            .map(|inner| inner.entries.get(&key).cloned())
            .map_err(|_| StateDbError::LockPoisoned);
        async move { value }
    }
}

impl ChainDbWrite for MemoryChainDb {
    fn commit(
        &self,
        changes: ChainChangeSet,
    ) -> impl Future<Output = Result<(), StateDbError>> + Send {
        let result = self.inner.write().map_err(|_| StateDbError::LockPoisoned).map(|mut inner| {
            for (name, record) in changes.accounts {
                match record {
                    Some(record) => inner.accounts.insert(name, record),
                    None => inner.accounts.remove(&name),
                };
            }
            for (key, value) in changes.entries {
                match value {
                    Some(value) => inner.entries.insert(key, value),
                    None => inner.entries.remove(&key),
                };
            }
            if let Some(producers) = changes.producers {
                inner.producers = producers;
            }
        });
        async move { result }
    }
}

/// Token ledger backed by a shared in-memory map.
///
/// Clones share the same state and failure switches.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenDb {
    entries: Arc<RwLock<BTreeMap<TokenKey, Bytes>>>,
    reject_prepare: Arc<AtomicBool>,
    fail_commit: Arc<AtomicBool>,
}

impl MemoryTokenDb {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record.
    #[must_use]
    pub fn with_entry(self, key: TokenKey, value: Bytes) -> Self {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).insert(key, value);
        self
    }

    /// Refuse every non-empty change set at prepare time.
    #[must_use]
    pub fn rejecting(self) -> Self {
        self.reject_prepare.store(true, Ordering::SeqCst);
        self
    }

    /// Accept change sets at prepare time but fail when committing them.
    #[must_use]
    pub fn failing_commits(self) -> Self {
        self.fail_commit.store(true, Ordering::SeqCst);
        self
    }

    /// Committed record.
    pub fn entry(&self, key: &TokenKey) -> Option<Bytes> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }
}

impl TokenDbRead for MemoryTokenDb {
    fn get(
        &self,
        key: &TokenKey,
    ) -> impl Future<Output = Result<Option<Bytes>, StateDbError>> + Send {
        let value = self
            .entries
            .read()
            .map(|entries| entries.get(key).cloned())
            .map_err(|_| StateDbError::LockPoisoned);
        async move { value }
    }
}

impl TokenDbWrite for MemoryTokenDb {
    fn prepare(
        &self,
        _changes: &TokenChangeSet,
    ) -> impl Future<Output = Result<(), StateDbError>> + Send {
        let result = if self.reject_prepare.load(Ordering::SeqCst) {
            Err(StateDbError::CommitRejected("ledger is read-only".to_string()))
        } else {
            Ok(())
        };
        async move { result }
    }

    fn commit(
        &self,
        changes: TokenChangeSet,
    ) -> impl Future<Output = Result<(), StateDbError>> + Send {
        let result = if self.fail_commit.load(Ordering::SeqCst) {
            Err(StateDbError::CommitRejected("ledger write failed".to_string()))
        } else {
            self.entries.write().map_err(|_| StateDbError::LockPoisoned).map(|mut entries| {
                for (key, value) in changes.entries {
                    match value {
                        Some(value) => entries.insert(key, value),
                        None => entries.remove(&key),
                    };
                }
            })
        };
        async move { result }
    }
}
