//! Storage contracts for the chain-state store and the token ledger.

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/evt-chain/evt/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod changes;
pub use changes::{AccountRecord, ChainChangeSet, EntryKey, TokenChangeSet, TokenKey};

mod error;
pub use error::StateDbError;

mod state;
pub use state::{ChainDb, ChainDbRead, ChainDbWrite, TokenDb, TokenDbRead, TokenDbWrite};
