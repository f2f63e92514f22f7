//! Action application context for the evt chain.

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/evt-chain/evt/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod adapter;

mod authority;
pub use authority::{AuthorizationChecker, AuthorizerWeight, Permission};

mod console;
pub use console::format_string;

mod context;
pub use context::{ActionKind, ApplyContext, apply_action};

mod error;
pub use error::{ApplyError, NotifyLimit};

mod executor;
pub use executor::{TransactionExecutor, TransactionTrace};

mod handler;
pub use handler::{ApplyHandler, Controller, HandlerRegistry};

mod notify;
pub use notify::NotificationRegistry;

/// Append the `Display` rendering of each value to a context's console.
///
/// ```ignore
/// console_append!(ctx, "balance: ", amount, " for ", owner);
/// ```
#[macro_export]
macro_rules! console_append {
    ($ctx:expr, $($value:expr),+ $(,)?) => {{
        $( $ctx.console_append($value); )+
    }};
}
