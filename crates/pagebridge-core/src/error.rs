//! Error types for the evaluation bridge.
//!
//! Every call surfaces at most one [`BridgeError`]. Variants group into four
//! kinds (see [`ErrorKind`]) so callers can tell a failing script apart from a
//! vanished execution context or from an argument the bridge refuses to send.

use crate::protocol::ContextId;
use crate::stack::StackFrame;
use std::fmt;
use thiserror::Error;

/// Main error type for the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    // Caller-input errors, raised before anything is sent
    #[error("Passed function is not well-serializable!")]
    MalformedCallable { source_text: String },

    #[error("JSHandle is disposed!")]
    HandleDisposed,

    #[error("JSHandles can be evaluated only in the context they were created! (handle context {handle}, target context {target})")]
    HandleContextMismatch { handle: ContextId, target: ContextId },

    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    // Decode errors
    #[error("Unsupported unserializable value: {0}")]
    UnsupportedUnserializableValue(String),

    #[error("Protocol error: {message}")]
    Protocol {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Remote script errors
    #[error(transparent)]
    RemoteScript(Box<RemoteScriptError>),

    // Transport errors
    #[error("Execution context was destroyed, most likely because of a navigation.")]
    ExecutionContextDestroyed,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Coarse classification of a [`BridgeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller passed something the bridge cannot send.
    CallerInput,
    /// The response could not be decoded.
    Decode,
    /// The evaluated program threw.
    RemoteScript,
    /// The command channel failed or the context is gone.
    Transport,
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::MalformedCallable { .. }
            | BridgeError::HandleDisposed
            | BridgeError::HandleContextMismatch { .. }
            | BridgeError::Validation { .. } => ErrorKind::CallerInput,

            BridgeError::UnsupportedUnserializableValue(_) | BridgeError::Protocol { .. } => {
                ErrorKind::Decode
            }

            BridgeError::RemoteScript(_) => ErrorKind::RemoteScript,

            BridgeError::ExecutionContextDestroyed | BridgeError::Transport(_) => {
                ErrorKind::Transport
            }
        }
    }

    /// True when the target context is gone; further calls on it will fail too.
    pub fn is_context_destroyed(&self) -> bool {
        matches!(self, BridgeError::ExecutionContextDestroyed)
    }

    /// The structured script error, if the remote program threw.
    pub fn as_remote_script(&self) -> Option<&RemoteScriptError> {
        match self {
            BridgeError::RemoteScript(err) => Some(&**err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Protocol {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<RemoteScriptError> for BridgeError {
    fn from(err: RemoteScriptError) -> Self {
        BridgeError::RemoteScript(Box::new(err))
    }
}

/// Failure reported by the command channel itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Protocol error ({method}): {message}")]
pub struct TransportError {
    /// Command that was being sent, when known.
    pub method: String,
    pub message: String,
}

impl TransportError {
    pub fn new(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            message: message.into(),
        }
    }
}

/// An exception thrown by the evaluated program.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteScriptError {
    /// Remote exception class (`TypeError`, ...). `None` for thrown primitives.
    pub class_name: Option<String>,
    /// First line of the description.
    pub message: String,
    /// Full remote description, stack included.
    pub description: String,
    /// Frames parsed from the description, innermost first.
    pub stack: Vec<StackFrame>,
    /// Caller-side frame index supplied with the call.
    pub caller_frame: Option<usize>,
}

impl RemoteScriptError {
    /// Frames that do not belong to the synthetic evaluation script.
    pub fn user_frames(&self) -> impl Iterator<Item = &StackFrame> {
        self.stack.iter().filter(|frame| !frame.is_evaluation_script())
    }
}

impl fmt::Display for RemoteScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Evaluation failed: {}", self.description)
    }
}

impl std::error::Error for RemoteScriptError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(BridgeError::HandleDisposed.to_string(), "JSHandle is disposed!");
        assert_eq!(
            BridgeError::UnsupportedUnserializableValue("1e400".into()).to_string(),
            "Unsupported unserializable value: 1e400"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            BridgeError::MalformedCallable {
                source_text: "get x() {}".into()
            }
            .kind(),
            ErrorKind::CallerInput
        );
        assert_eq!(
            BridgeError::UnsupportedUnserializableValue("x".into()).kind(),
            ErrorKind::Decode
        );
        assert_eq!(BridgeError::ExecutionContextDestroyed.kind(), ErrorKind::Transport);
        assert!(BridgeError::ExecutionContextDestroyed.is_context_destroyed());
        assert!(!BridgeError::HandleDisposed.is_context_destroyed());
    }

    #[test]
    fn test_transport_error_is_transparent() {
        let err: BridgeError = TransportError::new("Runtime.evaluate", "socket closed").into();
        assert_eq!(err.to_string(), "Protocol error (Runtime.evaluate): socket closed");
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_remote_script_display() {
        let err = RemoteScriptError {
            class_name: Some("Error".into()),
            message: "Error: boom".into(),
            description: "Error: boom\n    at <anonymous>:1:7".into(),
            stack: Vec::new(),
            caller_frame: None,
        };
        let bridge: BridgeError = err.into();
        assert!(bridge.to_string().starts_with("Evaluation failed: Error: boom"));
        assert!(bridge.as_remote_script().is_some());
    }
}
