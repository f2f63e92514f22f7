//! Apply engine limits.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default bound on nested notification depth.
pub const DEFAULT_MAX_NOTIFY_DEPTH: u32 = 4;

/// Default bound on distinct accounts invoked under one top-level action.
pub const DEFAULT_MAX_NOTIFIED_ACCOUNTS: usize = 64;

/// Largest accepted `max_notify_depth`.
pub const MAX_NOTIFY_DEPTH: u32 = 32;

/// Largest accepted `max_notified_accounts`.
pub const MAX_NOTIFIED_ACCOUNTS: usize = 4096;

/// Default bound on the packed transaction size.
pub const DEFAULT_MAX_TRANSACTION_BYTES: usize = 512 * 1024;

/// Resource limits enforced while applying actions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplyConfig {
    /// Maximum nesting depth of notified contexts. The primary receiver runs at depth 0.
    #[serde(default = "default_max_notify_depth")]
    pub max_notify_depth: u32,

    /// Maximum number of distinct receivers, primary included, per top-level action.
    #[serde(default = "default_max_notified_accounts")]
    pub max_notified_accounts: usize,

    /// Maximum size of a packed transaction.
    #[serde(default = "default_max_transaction_bytes")]
    pub max_transaction_bytes: usize,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            max_notify_depth: DEFAULT_MAX_NOTIFY_DEPTH,
            max_notified_accounts: DEFAULT_MAX_NOTIFIED_ACCOUNTS,
            max_transaction_bytes: DEFAULT_MAX_TRANSACTION_BYTES,
        }
    }
}

impl ApplyConfig {
    /// Set the notification depth bound.
    #[must_use]
    pub const fn with_max_notify_depth(mut self, depth: u32) -> Self {
        self.max_notify_depth = depth;
        self
    }

    /// Set the notification breadth bound.
    #[must_use]
    pub const fn with_max_notified_accounts(mut self, accounts: usize) -> Self {
        self.max_notified_accounts = accounts;
        self
    }

    /// Set the packed transaction size bound.
    #[must_use]
    pub const fn with_max_transaction_bytes(mut self, bytes: usize) -> Self {
        self.max_transaction_bytes = bytes;
        self
    }

    /// Check that the limits are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_notify_depth > MAX_NOTIFY_DEPTH {
            return Err(ConfigError::Invalid(format!(
                "max_notify_depth {} exceeds {MAX_NOTIFY_DEPTH}",
                self.max_notify_depth
            )));
        }
        if self.max_notified_accounts > MAX_NOTIFIED_ACCOUNTS {
            return Err(ConfigError::Invalid(format!(
                "max_notified_accounts {} exceeds {MAX_NOTIFIED_ACCOUNTS}",
                self.max_notified_accounts
            )));
        }
        if self.max_notified_accounts == 0 {
            return Err(ConfigError::Invalid(
                "max_notified_accounts must admit the primary receiver".to_string(),
            ));
        }
        if self.max_transaction_bytes == 0 {
            return Err(ConfigError::Invalid("max_transaction_bytes must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Load from a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

const fn default_max_notify_depth() -> u32 {
    DEFAULT_MAX_NOTIFY_DEPTH
}

const fn default_max_notified_accounts() -> usize {
    DEFAULT_MAX_NOTIFIED_ACCOUNTS
}

const fn default_max_transaction_bytes() -> usize {
    DEFAULT_MAX_TRANSACTION_BYTES
}
