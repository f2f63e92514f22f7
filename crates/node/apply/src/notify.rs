//! Per-action notification bookkeeping.

use std::collections::BTreeSet;

use evt_primitives::AccountName;

use crate::{ApplyError, NotifyLimit};

/// Ordered set of receivers invoked under one top-level action.
#[derive(Clone, Debug, Default)]
pub struct NotificationRegistry {
    order: Vec<AccountName>,
    seen: BTreeSet<AccountName>,
}

impl NotificationRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `account` has already been recorded.
    pub fn contains(&self, account: &AccountName) -> bool {
        self.seen.contains(account)
    }

    /// Number of recorded receivers.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Receivers in the order they were recorded.
    pub fn accounts(&self) -> &[AccountName] {
        &self.order
    }

    /// Record `account`, allowing at most `max` distinct receivers.
    ///
    /// Returns `false` when the account was already present.
    pub fn insert(&mut self, account: AccountName, max: usize) -> Result<bool, ApplyError> {
        if self.seen.contains(&account) {
            return Ok(false);
        }
        if self.order.len() >= max {
            return Err(ApplyError::RecursionLimitExceeded {
                limit: NotifyLimit::Breadth,
                value: self.order.len() + 1,
                max,
            });
        }
        self.seen.insert(account);
        self.order.push(account);
        Ok(true)
    }
}
