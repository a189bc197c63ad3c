//! Centralized configuration for the evaluation bridge.
//!
//! Process-wide constants (the evaluation script marker, the protocol method
//! names and the transport phrases the error translator matches on) plus the
//! per-call [`EvaluateOptions`].

/// Evaluation-level configuration.
pub struct EvaluationConfig;

impl EvaluationConfig {
    /// URL attributed to every script the bridge sends.
    pub const SCRIPT_URL: &'static str = "__pagebridge_evaluation_script__";
    pub const SOURCE_URL_PREFIX: &'static str = "//# sourceURL=";

    pub const EVALUATE_METHOD: &'static str = "Runtime.evaluate";
    pub const CALL_FUNCTION_ON_METHOD: &'static str = "Runtime.callFunctionOn";

    /// Location-marker comment appended to program text.
    pub fn source_url_comment() -> String {
        format!("{}{}", Self::SOURCE_URL_PREFIX, Self::SCRIPT_URL)
    }
}

/// Fixed transport wording recognized by the error translator.
///
/// These are exact phrases emitted by the remote protocol implementation. If
/// its wording changes, classification silently stops matching.
pub struct TransportPhrases;

impl TransportPhrases {
    pub const REFERENCE_CHAIN_TOO_LONG: &'static str = "Object reference chain is too long";
    pub const NOT_RETURNABLE_BY_VALUE: &'static str = "Object couldn't be returned by value";
    pub const CONTEXT_NOT_FOUND: &'static str = "Cannot find context with specified id";
    pub const TARGET_NAVIGATED: &'static str = "Inspected target navigated or closed";
    pub const CIRCULAR_STRUCTURE: &'static str = "Converting circular structure to JSON";
    pub const NESTED_HANDLE_HINT: &'static str = " Are you passing a nested JSHandle?";
}

/// Per-call evaluation flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluateOptions {
    /// Serialize the result by value instead of returning a remote reference.
    pub return_by_value: bool,
    /// Wait for a returned promise to settle.
    pub await_promise: bool,
    /// Treat the evaluation as initiated by a user gesture.
    pub user_gesture: bool,
    /// Index of the calling frame in the caller's own stack, carried into
    /// remote script errors for symbolication.
    pub caller_frame: Option<usize>,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self {
            return_by_value: true,
            await_promise: true,
            user_gesture: true,
            caller_frame: None,
        }
    }
}

impl EvaluateOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a remote reference instead of a by-value result.
    pub fn by_reference(mut self) -> Self {
        self.return_by_value = false;
        self
    }

    /// Enable or disable awaiting of promise results.
    pub fn with_await_promise(mut self, await_promise: bool) -> Self {
        self.await_promise = await_promise;
        self
    }

    /// Enable or disable the user gesture flag.
    pub fn with_user_gesture(mut self, user_gesture: bool) -> Self {
        self.user_gesture = user_gesture;
        self
    }

    /// Record the caller's frame index.
    pub fn with_caller_frame(mut self, frame: usize) -> Self {
        self.caller_frame = Some(frame);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_url_comment() {
        assert_eq!(
            EvaluationConfig::source_url_comment(),
            "//# sourceURL=__pagebridge_evaluation_script__"
        );
    }

    #[test]
    fn test_default_options() {
        let options = EvaluateOptions::default();
        assert!(options.return_by_value);
        assert!(options.await_promise);
        assert!(options.user_gesture);
        assert_eq!(options.caller_frame, None);
    }

    #[test]
    fn test_options_builder() {
        let options = EvaluateOptions::new()
            .by_reference()
            .with_await_promise(false)
            .with_caller_frame(3);
        assert!(!options.return_by_value);
        assert!(!options.await_promise);
        assert_eq!(options.caller_frame, Some(3));
    }
}
