//! Pending mutations for both stores.

use std::collections::BTreeMap;

use evt_primitives::{AccountName, Bytes, DomainName, Name};
use serde::{Deserialize, Serialize};

/// An account as seen by the apply context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Account name.
    pub name: AccountName,
    /// Whether the account carries the system (privileged) role.
    pub privileged: bool,
}

impl AccountRecord {
    /// A regular, non-privileged account.
    pub const fn new(name: AccountName) -> Self {
        Self { name, privileged: false }
    }

    /// A system account.
    pub const fn privileged(name: AccountName) -> Self {
        Self { name, privileged: true }
    }
}

/// Key of a scoped chain-state entry.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryKey {
    /// Owning account.
    pub scope: AccountName,
    /// Raw key within the scope.
    pub key: Bytes,
}

impl EntryKey {
    /// Create a new entry key.
    pub const fn new(scope: AccountName, key: Bytes) -> Self {
        Self { scope, key }
    }
}

/// Key of a token-ledger record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TokenKey {
    /// A domain definition.
    Domain(DomainName),
    /// A token within a domain.
    Token {
        /// Owning domain.
        domain: DomainName,
        /// Token name.
        name: Name,
    },
}

/// Accumulated chain-state changes.
///
/// `None` values are deletions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChainChangeSet {
    /// Account creations, updates and removals.
    pub accounts: BTreeMap<AccountName, Option<AccountRecord>>,
    /// Scoped key/value entries.
    pub entries: BTreeMap<EntryKey, Option<Bytes>>,
    /// Replacement producer schedule, if one was set.
    pub producers: Option<Vec<AccountName>>,
}

impl ChainChangeSet {
    /// Create an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty() && self.entries.is_empty() && self.producers.is_none()
    }
}

/// Accumulated token-ledger changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenChangeSet {
    /// Domain and token records; `None` values are deletions.
    pub entries: BTreeMap<TokenKey, Option<Bytes>>,
}

impl TokenChangeSet {
    /// Create an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of touched records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
