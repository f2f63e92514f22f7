//! Configuration types for the evt apply engine.
#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/evt-chain/evt/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod apply;
pub use apply::{
    ApplyConfig, DEFAULT_MAX_NOTIFIED_ACCOUNTS, DEFAULT_MAX_NOTIFY_DEPTH,
    DEFAULT_MAX_TRANSACTION_BYTES, MAX_NOTIFIED_ACCOUNTS, MAX_NOTIFY_DEPTH,
};

mod error;
pub use error::ConfigError;
