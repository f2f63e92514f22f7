//! Per-invocation traces.

use std::time::Duration;

use evt_primitives::{AccountName, Bytes};
use serde::{Deserialize, Serialize};

use crate::Action;

/// The recorded outcome of one handler invocation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionTrace {
    /// Account whose handler ran.
    pub receiver: AccountName,
    /// The action that was applied.
    pub act: Action,
    /// Console output captured during this invocation only.
    pub console: String,
    /// Opaque effect records emitted by the handler.
    #[serde(default)]
    pub effects: Vec<Bytes>,
    /// Wall-clock time spent in the handler. Not part of the receipt.
    #[serde(skip)]
    pub elapsed: Duration,
}

impl ActionTrace {
    /// Create a trace with no effects.
    pub fn new(receiver: AccountName, act: Action, console: String) -> Self {
        Self { receiver, act, console, effects: Vec::new(), elapsed: Duration::ZERO }
    }
}

/// Ordered traces of every invocation under one top-level action.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ApplyResults {
    /// Traces in execution order.
    pub applied_actions: Vec<ActionTrace>,
}

impl ApplyResults {
    /// Create empty results.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded traces.
    pub fn len(&self) -> usize {
        self.applied_actions.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.applied_actions.is_empty()
    }

    /// Record one trace.
    pub fn push(&mut self, trace: ActionTrace) {
        self.applied_actions.push(trace);
    }

    /// Move every trace of `other` onto the end, keeping its order.
    pub fn append(&mut self, mut other: Self) {
        self.applied_actions.append(&mut other.applied_actions);
    }

    /// Receivers in execution order.
    pub fn receivers(&self) -> impl Iterator<Item = AccountName> + '_ {
        self.applied_actions.iter().map(|trace| trace.receiver)
    }
}
