#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/evt-chain/evt/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub use alloy_primitives::{B256, Bytes, keccak256};

mod name;
pub use name::{Name, NameError};

/// Account identifier.
pub type AccountName = Name;

/// Action (operation) identifier.
pub type ActionName = Name;

/// Identifier of a protected asset domain.
pub type DomainName = Name;

/// Permission key claimed on a domain.
pub type DomainKey = Name;
