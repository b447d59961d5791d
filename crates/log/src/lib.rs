//! Prints what goes in and out of a function on every call.
//!
//! Each call of a logged function writes one block to stdout:
//!
//! ```text
//!
//! ##### @Log add #####
//!     Args: ["a", "b"]
//!     Default Args: None
//!
//!     Input: (3, 5) {}
//!
//!     Output: (8, 3, 5)
//! ##### Log add END (Time: 2.1e-06 s) #####
//!
//! ```
//!
//! Arguments and the return value go through the display transform first:
//! sequences longer than the threshold (10 by default) are cut to their first
//! ten items and array-like values with more elements than that only print
//! their shape. See [`Loggable`].
//!
//! There are two ways in:
//! 1. `#[log_call]` on a function or method. The parameter list is read at
//!  compile time. Options are semantic string literals:
//!     ```
//!     use call_log::log_call;
//!
//!     #[log_call("except token", "named retries", "default retries=3")]
//!     fn fetch(url: &str, token: &str, retries: u8) -> usize {
//!         url.len() + token.len() + retries as usize
//!     }
//!
//!     assert_eq!(21, fetch("https://a.io", "secret", 3));
//!     ```
//!     prints `Default Args: (3,)`, `Input: ("https://a.io", ignored) {"retries": 3}`
//!     along with the rest of the block.
//! 2. [`log`] wraps a closure at runtime, given a [`Signature`] describing it.
//!
//! Besides the console block, every finished call is sent to the `log` facade
//! at debug level as a [`LogModel`], with the function name as target, and the
//! function name is kept in the MDC under `fn_name` while the call runs.
//!
//! Note:
//! 1. Arguments and return values need to implement [`Loggable`]; `except`
//!  arguments and receivers don't.
//! 2. A panic in the logged function unwinds through unchanged, the end of the
//!  block is not printed.

mod config;
mod console;
mod display;
mod error;
mod logger;
mod signature;
mod text;
mod wrap;

pub use call_log_impl::*;
pub use config::{global_config, set_global_config, LogConfig, DEFAULT_THRESHOLD, DEFAULT_WIDTH};
pub use console::capture;
pub use display::{transform, Delimiter, Ignored, Loggable, Rendered, Sequence};
pub use error::{CallLogError, CallLogResult};
pub use logger::{ActiveCall, CallLogger, FN_NAME_KEY};
pub use signature::{Parameter, ParameterKind, Signature};
pub use text::{fill, format_seconds};
pub use wrap::{log, Arguments, Logged};

#[derive(Debug)]
pub struct LogModel<'a> {
    pub fn_name: &'a str,
    pub fn_args: &'a [&'a str],
    pub fn_return: &'a str,
}

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
}
