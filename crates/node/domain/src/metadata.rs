//! Transaction metadata shared by every apply context of one transaction.

use std::{sync::OnceLock, time::Instant};

use commonware_codec::Encode;
use evt_primitives::{Bytes, keccak256};
use tracing::trace;

use crate::{Transaction, TxId};

/// A transaction under execution.
///
/// Holds the parsed transaction, its raw signatures and optional processing
/// deadline, plus a cache of the packed transaction bytes. The cache is
/// filled on first use and is never invalidated, so every context borrowing
/// the same metadata observes the same bytes.
#[derive(Debug)]
pub struct TransactionMetadata {
    trx: Transaction,
    signatures: Vec<Bytes>,
    deadline: Option<Instant>,
    packed: OnceLock<Bytes>,
    id: OnceLock<TxId>,
}

impl TransactionMetadata {
    /// Wrap a transaction.
    pub const fn new(trx: Transaction) -> Self {
        Self {
            trx,
            signatures: Vec::new(),
            deadline: None,
            packed: OnceLock::new(),
            id: OnceLock::new(),
        }
    }

    /// Attach the raw signatures carried by the transaction.
    #[must_use]
    pub fn with_signatures(mut self, signatures: Vec<Bytes>) -> Self {
        self.signatures = signatures;
        self
    }

    /// Set the processing deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// The parsed transaction.
    pub const fn trx(&self) -> &Transaction {
        &self.trx
    }

    /// Raw signatures.
    pub fn signatures(&self) -> &[Bytes] {
        &self.signatures
    }

    /// Processing deadline, if any.
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the deadline has passed at `now`.
    pub fn deadline_exceeded(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// The packed transaction, encoded on first call.
    pub fn packed_trx(&self) -> &Bytes {
        self.packed.get_or_init(|| {
            let packed = Bytes::copy_from_slice(&self.trx.encode());
            trace!(size = packed.len(), "packed transaction");
            packed
        })
    }

    /// Whether the packed form has been computed.
    pub fn is_packed(&self) -> bool {
        self.packed.get().is_some()
    }

    /// Size of the packed transaction in bytes.
    pub fn packed_size(&self) -> usize {
        self.packed_trx().len()
    }

    /// Transaction identifier, derived from the packed bytes.
    pub fn id(&self) -> TxId {
        *self.id.get_or_init(|| TxId(keccak256(self.packed_trx())))
    }
}

impl From<Transaction> for TransactionMetadata {
    fn from(trx: Transaction) -> Self {
        Self::new(trx)
    }
}
