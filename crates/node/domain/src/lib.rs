//! Core domain types used across the evt apply engine.
#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/evt-chain/evt/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod action;
pub use action::{Action, ActionCfg, AuthorizerRef};

mod idents;
pub use idents::TxId;

mod metadata;
pub use metadata::TransactionMetadata;

mod trace;
pub use trace::{ActionTrace, ApplyResults};

mod transaction;
pub use transaction::{Transaction, TransactionCfg};
