//! Pagebridge - Evaluate scripts and functions inside a remote page.
//!
//! This crate turns a caller's program (an expression or the source of a
//! function) plus arguments into one remote-protocol command, sends it over a
//! caller-supplied [`CommandChannel`], and maps the response back into a
//! [`JsValue`] or a structured [`BridgeError`].
//!
//! It owns no transport and no context tracking. The caller supplies the
//! channel and the execution context id for each call.
//!
//! # Example
//!
//! ```rust,ignore
//! use pagebridge::{ContextId, EvalArg, JsValue, Program, ScriptBridge};
//! use std::sync::Arc;
//!
//! async fn run(channel: Arc<MyChannel>) -> pagebridge::Result<()> {
//!     let bridge = ScriptBridge::new(channel);
//!     let page = bridge.context(ContextId(1));
//!
//!     let sum = page.evaluate(&Program::expression("1 + 1"), &[]).await?;
//!     assert_eq!(sum.as_f64(), Some(2.0));
//!
//!     // Shorthand methods are accepted
//!     let next = page
//!         .evaluate(
//!             &Program::function("increment(x) { return x + 1 }"),
//!             &[EvalArg::from(JsValue::from(5i64))],
//!         )
//!         .await?;
//!     assert_eq!(next.as_f64(), Some(6.0));
//!
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod channel;
pub mod config;
pub mod error;
pub mod handle;
pub mod marshal;
pub mod program;
pub mod protocol;
pub mod stack;
pub mod syntax;
pub mod translate;

// Re-export commonly used types
pub use bridge::{ExecutionContext, ScriptBridge};
pub use channel::CommandChannel;
pub use config::{EvaluateOptions, EvaluationConfig};
pub use error::{BridgeError, ErrorKind, RemoteScriptError, Result, TransportError};
pub use handle::{JsHandle, RemoteHandle};
pub use marshal::{EvalArg, JsValue};
pub use program::{EncodedProgram, Program};
pub use protocol::{CallArgument, CommandOutcome, ContextId, RemoteObject};
pub use stack::StackFrame;
