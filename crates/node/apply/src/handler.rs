//! Handler capability and dispatch.

use std::{collections::BTreeMap, fmt};

use evt_config::{ApplyConfig, ConfigError};
use evt_primitives::{AccountName, ActionName};
use evt_traits::AccountRecord;

use crate::{ApplyContext, ApplyError};

/// Native code run for one receiver of one action.
pub trait ApplyHandler<C, T>: Send + Sync {
    /// Apply the context's action on behalf of the context's receiver.
    fn apply(&self, ctx: &mut ApplyContext<'_, C, T>) -> Result<(), ApplyError>;
}

impl<C, T, F> ApplyHandler<C, T> for F
where
    F: Fn(&mut ApplyContext<'_, C, T>) -> Result<(), ApplyError> + Send + Sync,
{
    fn apply(&self, ctx: &mut ApplyContext<'_, C, T>) -> Result<(), ApplyError> {
        self(ctx)
    }
}

/// Services an [`ApplyContext`] needs from the chain controller.
pub trait Controller<C, T> {
    /// Resolve the handler for `action` when delivered to `receiver`.
    ///
    /// `None` means the receiver has no code for this action; it still gets a trace.
    fn find_apply_handler(
        &self,
        receiver: &AccountName,
        action: &ActionName,
    ) -> Option<&dyn ApplyHandler<C, T>>;

    /// Whether the account may perform privileged operations.
    fn is_privileged(&self, record: &AccountRecord) -> bool {
        record.privileged
    }

    /// Resource limits.
    fn config(&self) -> &ApplyConfig;
}

/// In-memory [`Controller`] keyed by `(receiver, action)`.
pub struct HandlerRegistry<C, T> {
    handlers: BTreeMap<(AccountName, ActionName), Box<dyn ApplyHandler<C, T>>>,
    config: ApplyConfig,
}

impl<C, T> HandlerRegistry<C, T> {
    /// Create an empty registry enforcing `config`.
    ///
    /// Fails when `config` does not pass [`ApplyConfig::validate`].
    pub fn new(config: ApplyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { handlers: BTreeMap::new(), config })
    }

    /// Register a closure. Replaces any previous handler for the pair.
    pub fn register<F>(&mut self, receiver: AccountName, action: ActionName, handler: F) -> &mut Self
    where
        F: Fn(&mut ApplyContext<'_, C, T>) -> Result<(), ApplyError> + Send + Sync + 'static,
    {
        self.register_handler(receiver, action, handler)
    }

    /// Register a handler value.
    pub fn register_handler<H>(
        &mut self,
        receiver: AccountName,
        action: ActionName,
        handler: H,
    ) -> &mut Self
    where
        H: ApplyHandler<C, T> + 'static,
    {
        self.handlers.insert((receiver, action), Box::new(handler));
        self
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<C, T> Controller<C, T> for HandlerRegistry<C, T> {
    fn find_apply_handler(
        &self,
        receiver: &AccountName,
        action: &ActionName,
    ) -> Option<&dyn ApplyHandler<C, T>> {
        self.handlers.get(&(*receiver, *action)).map(|handler| handler.as_ref())
    }

    fn config(&self) -> &ApplyConfig {
        &self.config
    }
}

impl<C, T> fmt::Debug for HandlerRegistry<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}
