#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/evt-chain/evt/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod chain;
pub use chain::ChainSession;

mod scope;
pub use scope::StateScope;

mod token;
pub use token::TokenSession;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
