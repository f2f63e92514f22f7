//! The per-action apply context.

use std::{
    fmt::{self, Display},
    mem,
    time::Instant,
};

use commonware_codec::{Encode, EncodeSize};
use evt_domain::{Action, ActionTrace, ApplyResults, AuthorizerRef, TransactionMetadata};
use evt_overlay::{ChainSession, TokenSession};
use evt_primitives::{AccountName, Bytes, DomainKey, DomainName};
use evt_traits::{ChainDbRead, TokenDbRead, TokenKey};
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::{
    ApplyError, AuthorizationChecker, Controller, NotificationRegistry, NotifyLimit, Permission,
    adapter, format_string,
};

/// Which action list of the transaction [`ApplyContext::get_action`] reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum ActionKind {
    /// `context_free_actions`.
    ContextFree = 0,
    /// `actions`.
    Input = 1,
}

impl ActionKind {
    /// Decode the raw selector.
    pub const fn from_raw(kind: u32) -> Option<Self> {
        match kind {
            0 => Some(Self::ContextFree),
            1 => Some(Self::Input),
            _ => None,
        }
    }
}

/// Execution context for one receiver of one action.
///
/// The primary context is created for `act.account`. Every account the
/// handler notifies gets a nested context over the same action, sessions and
/// notification registry, one level deeper. Results of nested contexts are
/// appended to the parent's in execution order.
pub struct ApplyContext<'a, C, T> {
    controller: &'a dyn Controller<C, T>,
    chain: &'a mut ChainSession<C>,
    tokens: &'a mut TokenSession<T>,
    act: &'a Action,
    trx_meta: &'a TransactionMetadata,
    notified: &'a mut NotificationRegistry,
    checker: AuthorizationChecker<'a>,
    receiver: AccountName,
    privileged: bool,
    depth: u32,
    pending_notifications: Vec<AccountName>,
    console: String,
    effects: Vec<Bytes>,
    results: ApplyResults,
}

impl<'a, C: ChainDbRead, T: TokenDbRead> ApplyContext<'a, C, T> {
    /// Create the primary context for `act`.
    ///
    /// Fails with [`ApplyError::AccountNotFound`] when `act.account` does not exist.
    pub fn new(
        controller: &'a dyn Controller<C, T>,
        chain: &'a mut ChainSession<C>,
        tokens: &'a mut TokenSession<T>,
        act: &'a Action,
        trx_meta: &'a TransactionMetadata,
        notified: &'a mut NotificationRegistry,
    ) -> Result<Self, ApplyError> {
        let receiver = act.account;
        let privileged = privilege_of(controller, chain, receiver)?;
        notified.insert(receiver, controller.config().max_notified_accounts)?;
        Ok(Self {
            controller,
            chain,
            tokens,
            act,
            trx_meta,
            notified,
            checker: AuthorizationChecker::new(&act.authorization),
            receiver,
            privileged,
            depth: 0,
            pending_notifications: Vec::new(),
            console: String::new(),
            effects: Vec::new(),
            results: ApplyResults::new(),
        })
    }

    /// Run this receiver's handler, then every notified receiver, depth first.
    ///
    /// Any failure aborts the whole tree; the caller discards the state scope.
    pub fn exec(&mut self) -> Result<(), ApplyError> {
        self.exec_one()?;

        let config = self.controller.config();
        let (max_depth, max_accounts) = (config.max_notify_depth, config.max_notified_accounts);
        for account in mem::take(&mut self.pending_notifications) {
            if self.notified.contains(&account) {
                continue;
            }
            let depth = self.depth + 1;
            if depth > max_depth {
                return Err(ApplyError::RecursionLimitExceeded {
                    limit: NotifyLimit::Depth,
                    value: depth as usize,
                    max: max_depth as usize,
                });
            }
            self.notified.insert(account, max_accounts)?;
            debug!(
                receiver = %account,
                notifier = %self.receiver,
                action = %self.act.name,
                depth,
                "delivering notification"
            );

            let mut nested = self.nested(account)?;
            nested.exec()?;
            let results = nested.into_results();
            self.append_results(results);
        }
        Ok(())
    }

    /// Run this receiver's handler once and record its trace.
    ///
    /// A receiver without a handler still produces a trace with an empty console.
    pub fn exec_one(&mut self) -> Result<(), ApplyError> {
        let start = Instant::now();
        let controller = self.controller;
        match controller.find_apply_handler(&self.receiver, &self.act.name) {
            Some(handler) => {
                if let Err(err) = handler.apply(self) {
                    warn!(
                        receiver = %self.receiver,
                        action = %self.act.name,
                        depth = self.depth,
                        console = %self.console,
                        %err,
                        "action handler failed"
                    );
                    return Err(err);
                }
            }
            None => trace!(receiver = %self.receiver, action = %self.act.name, "no handler"),
        }

        let mut action_trace =
            ActionTrace::new(self.receiver, self.act.clone(), mem::take(&mut self.console));
        action_trace.effects = mem::take(&mut self.effects);
        action_trace.elapsed = start.elapsed();
        trace!(
            receiver = %self.receiver,
            action = %self.act.name,
            elapsed = ?action_trace.elapsed,
            "applied action"
        );

        let mut results = ApplyResults::new();
        results.push(action_trace);
        self.append_results(results);
        Ok(())
    }

    fn nested(&mut self, receiver: AccountName) -> Result<ApplyContext<'_, C, T>, ApplyError> {
        let privileged = privilege_of(self.controller, self.chain, receiver)?;
        let act = self.act;
        Ok(ApplyContext {
            controller: self.controller,
            chain: &mut *self.chain,
            tokens: &mut *self.tokens,
            act,
            trx_meta: self.trx_meta,
            notified: &mut *self.notified,
            checker: AuthorizationChecker::new(&act.authorization),
            receiver,
            privileged,
            depth: self.depth + 1,
            pending_notifications: Vec::new(),
            console: String::new(),
            effects: Vec::new(),
            results: ApplyResults::new(),
        })
    }

    /// Whether `account` exists. Never fails.
    pub fn is_account(&self, account: AccountName) -> bool {
        adapter::account_exists(self.chain, account)
    }

    /// The active producer schedule, in schedule order.
    pub fn get_active_producers(&self) -> Result<Vec<AccountName>, ApplyError> {
        adapter::active_producers(self.chain)
    }

    /// Read an entry stored under an account scope.
    pub fn read_entry(&self, scope: AccountName, key: &Bytes) -> Result<Option<Bytes>, ApplyError> {
        adapter::read_entry(self.chain, scope, key)
    }

    /// Read a domain or token record.
    pub fn read_token(&self, key: &TokenKey) -> Result<Option<Bytes>, ApplyError> {
        adapter::read_token(self.tokens, key)
    }
}

impl<'a, C, T> ApplyContext<'a, C, T> {
    /// Whether `(domain, key)` is among the action's declared authorizations.
    ///
    /// Notified receivers see the same declarations and nothing more.
    pub fn has_authorized(&self, domain: DomainName, key: DomainKey) -> bool {
        self.checker.has_authorized(domain, key)
    }

    /// Fail unless `(domain, key)` is declared.
    pub fn require_authorization(
        &mut self,
        domain: DomainName,
        key: DomainKey,
    ) -> Result<(), ApplyError> {
        self.checker.require(domain, key)
    }

    /// Fail unless the declared authorizations meet `permission`'s threshold.
    pub fn check_permission(&mut self, permission: &Permission) -> Result<(), ApplyError> {
        self.checker.satisfy(permission).map(|_| ())
    }

    /// Declarations not consumed by any check in this context.
    pub fn unused_authorizations(&self) -> Vec<AuthorizerRef> {
        self.checker.unused()
    }

    /// Whether the receiver is privileged.
    pub const fn is_privileged(&self) -> bool {
        self.privileged
    }

    /// Fail unless the receiver is privileged.
    pub fn require_privileged(&self) -> Result<(), ApplyError> {
        if self.privileged {
            Ok(())
        } else {
            Err(ApplyError::PrivilegeViolation(self.receiver))
        }
    }

    /// The packed transaction, shared by every context over the same metadata.
    pub fn get_packed_transaction(&self) -> &'a Bytes {
        self.trx_meta.packed_trx()
    }

    /// Copy the encoding of one transaction action into `buffer`.
    ///
    /// Returns the number of bytes written. Nothing is copied when the
    /// buffer is too small.
    pub fn get_action(&self, kind: u32, index: u32, buffer: &mut [u8]) -> Result<usize, ApplyError> {
        let trx = self.trx_meta.trx();
        let actions = match ActionKind::from_raw(kind) {
            Some(ActionKind::ContextFree) => &trx.context_free_actions,
            Some(ActionKind::Input) => &trx.actions,
            None => return Err(ApplyError::ActionIndexOutOfRange { kind, index }),
        };
        let act = actions
            .get(index as usize)
            .ok_or(ApplyError::ActionIndexOutOfRange { kind, index })?;

        let required = act.encode_size();
        if required > buffer.len() {
            return Err(ApplyError::BufferTooSmall { required, available: buffer.len() });
        }
        buffer[..required].copy_from_slice(&act.encode());
        Ok(required)
    }

    /// Append the `Display` rendering of `value` to this receiver's console.
    pub fn console_append(&mut self, value: impl Display) -> &mut Self {
        self.console.push_str(&value.to_string());
        self
    }

    /// Append `fmt` with `${key}` placeholders substituted from `args`.
    pub fn console_append_formatted(&mut self, fmt: &str, args: &Map<String, Value>) -> &mut Self {
        self.console.push_str(&format_string(fmt, args));
        self
    }

    /// Console text captured so far in this context.
    pub fn console(&self) -> &str {
        &self.console
    }

    /// Attach an opaque effect record to this receiver's trace.
    pub fn emit_effect(&mut self, effect: impl Into<Bytes>) {
        self.effects.push(effect.into());
    }

    /// Ask for `account` to be notified of this action after this handler returns.
    pub fn notify(&mut self, account: AccountName) {
        self.pending_notifications.push(account);
    }

    /// Whether the transaction's processing deadline has passed.
    pub fn deadline_exceeded(&self) -> bool {
        self.trx_meta.deadline_exceeded(Instant::now())
    }

    /// The account whose handler runs in this context.
    pub const fn receiver(&self) -> AccountName {
        self.receiver
    }

    /// The action being applied.
    pub const fn action(&self) -> &'a Action {
        self.act
    }

    /// The enclosing transaction.
    pub const fn trx_meta(&self) -> &'a TransactionMetadata {
        self.trx_meta
    }

    /// Notification depth. The primary receiver runs at 0.
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Receivers recorded so far under this top-level action.
    pub fn notified(&self) -> &NotificationRegistry {
        self.notified
    }

    /// Chain-state session.
    pub fn chain(&self) -> &ChainSession<C> {
        self.chain
    }

    /// Mutable chain-state session.
    pub fn chain_mut(&mut self) -> &mut ChainSession<C> {
        self.chain
    }

    /// Token-ledger session.
    pub fn tokens(&self) -> &TokenSession<T> {
        self.tokens
    }

    /// Mutable token-ledger session.
    pub fn tokens_mut(&mut self) -> &mut TokenSession<T> {
        self.tokens
    }

    /// Traces recorded so far.
    pub const fn results(&self) -> &ApplyResults {
        &self.results
    }

    /// Consume the context, returning its traces.
    pub fn into_results(self) -> ApplyResults {
        self.results
    }

    fn append_results(&mut self, other: ApplyResults) {
        self.results.append(other);
    }
}

impl<C, T> fmt::Debug for ApplyContext<'_, C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplyContext")
            .field("receiver", &self.receiver)
            .field("action", &self.act.name)
            .field("privileged", &self.privileged)
            .field("depth", &self.depth)
            .field("pending_notifications", &self.pending_notifications)
            .field("traces", &self.results.len())
            .finish_non_exhaustive()
    }
}

fn privilege_of<C: ChainDbRead, T>(
    controller: &dyn Controller<C, T>,
    chain: &ChainSession<C>,
    receiver: AccountName,
) -> Result<bool, ApplyError> {
    let record = adapter::require_account(chain, receiver)?;
    Ok(controller.is_privileged(&record))
}

/// Apply one input action with a fresh notification registry.
///
/// Writes stay in the sessions; committing or discarding them is the caller's job.
pub fn apply_action<C: ChainDbRead, T: TokenDbRead>(
    controller: &dyn Controller<C, T>,
    chain: &mut ChainSession<C>,
    tokens: &mut TokenSession<T>,
    act: &Action,
    trx_meta: &TransactionMetadata,
) -> Result<ApplyResults, ApplyError> {
    let mut notified = NotificationRegistry::new();
    let mut ctx = ApplyContext::new(controller, chain, tokens, act, trx_meta, &mut notified)?;
    ctx.exec()?;
    Ok(ctx.into_results())
}
