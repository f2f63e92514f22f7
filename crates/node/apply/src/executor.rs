//! Whole-transaction application over a single state scope.

use std::{fmt, time::Instant};

use evt_domain::{ApplyResults, TransactionMetadata, TxId};
use evt_overlay::StateScope;
use evt_traits::{ChainDb, TokenDb};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{ApplyError, Controller, adapter::block_on, apply_action};

/// Traces of one applied transaction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionTrace {
    /// Transaction id.
    pub id: TxId,
    /// One entry per input action, in transaction order.
    pub action_results: Vec<ApplyResults>,
}

impl TransactionTrace {
    /// Total number of action traces across every input action.
    pub fn trace_count(&self) -> usize {
        self.action_results.iter().map(ApplyResults::len).sum()
    }
}

/// Applies transactions action by action, atomically.
pub struct TransactionExecutor<'a, C, T> {
    controller: &'a dyn Controller<C, T>,
}

impl<'a, C: ChainDb, T: TokenDb> TransactionExecutor<'a, C, T> {
    /// Create an executor dispatching through `controller`.
    pub const fn new(controller: &'a dyn Controller<C, T>) -> Self {
        Self { controller }
    }

    /// Apply every input action of the transaction.
    ///
    /// All writes land in both stores together on success. On any failure
    /// both stores are left as they were, including when the ledger refuses
    /// its commit.
    pub fn apply_transaction(
        &self,
        chain: C,
        tokens: T,
        trx_meta: &TransactionMetadata,
    ) -> Result<TransactionTrace, ApplyError> {
        let max = self.controller.config().max_transaction_bytes;
        let size = trx_meta.packed_size();
        if size > max {
            return Err(ApplyError::TransactionTooLarge { size, max });
        }

        let id = trx_meta.id();
        let mut scope = StateScope::new(chain, tokens);
        match self.apply_actions(&mut scope, trx_meta) {
            Ok(action_results) => {
                block_on(scope.commit())?;
                debug!(%id, actions = action_results.len(), "applied transaction");
                Ok(TransactionTrace { id, action_results })
            }
            Err(err) => {
                warn!(%id, %err, "transaction failed, discarding state changes");
                scope.rollback();
                Err(err)
            }
        }
    }

    fn apply_actions(
        &self,
        scope: &mut StateScope<C, T>,
        trx_meta: &TransactionMetadata,
    ) -> Result<Vec<ApplyResults>, ApplyError> {
        let (chain, tokens) = scope.sessions_mut();
        let actions = &trx_meta.trx().actions;
        let mut results = Vec::with_capacity(actions.len());
        for act in actions {
            if trx_meta.deadline_exceeded(Instant::now()) {
                return Err(ApplyError::DeadlineExceeded);
            }
            results.push(apply_action(self.controller, chain, tokens, act, trx_meta)?);
        }
        Ok(results)
    }
}

impl<C, T> fmt::Debug for TransactionExecutor<'_, C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionExecutor")
            .field("config", self.controller.config())
            .finish()
    }
}
