//! Error translation.
//!
//! Remote exceptions become [`RemoteScriptError`]s with a parsed stack.
//! Transport failures are classified by fixed phrases: two mean the value
//! could not be serialized but the call itself went through, two mean the
//! context is gone, everything else passes through untouched.

use crate::config::TransportPhrases;
use crate::error::{RemoteScriptError, TransportError};
use crate::protocol::ExceptionDetails;
use crate::stack::{message_portion, parse_stack};
use serde_json::Value;

/// Classification of a transport failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// The call succeeded but its value could not be returned.
    EmptySuccess,
    /// The target execution context no longer exists.
    ContextDestroyed,
    /// Anything else, unmodified.
    Passthrough(TransportError),
}

/// Classify a transport error.
pub fn rewrite_transport_error(err: TransportError) -> Rewrite {
    let message = err.message.as_str();
    if message.contains(TransportPhrases::REFERENCE_CHAIN_TOO_LONG)
        || message.contains(TransportPhrases::NOT_RETURNABLE_BY_VALUE)
    {
        return Rewrite::EmptySuccess;
    }
    if message.ends_with(TransportPhrases::CONTEXT_NOT_FOUND)
        || message.ends_with(TransportPhrases::TARGET_NAVIGATED)
    {
        return Rewrite::ContextDestroyed;
    }
    Rewrite::Passthrough(err)
}

/// Add a hint to argument-encoding failures caused by a cyclic value.
///
/// Returns `None` when the error is not one.
pub fn annotate_circular_structure(err: &TransportError) -> Option<TransportError> {
    if err.message.starts_with(TransportPhrases::CIRCULAR_STRUCTURE) {
        Some(TransportError {
            method: err.method.clone(),
            message: format!("{}{}", err.message, TransportPhrases::NESTED_HANDLE_HINT),
        })
    } else {
        None
    }
}

/// Full description of a remote exception.
///
/// Prefers the exception object's own description, then its plain value;
/// otherwise the exception text with one `at` line per reported frame.
pub fn exception_description(details: &ExceptionDetails) -> String {
    if let Some(exception) = &details.exception {
        if let Some(description) = &exception.description {
            return description.clone();
        }
        match &exception.value {
            Some(Value::String(s)) => return s.clone(),
            Some(value) => return value.to_string(),
            None => {}
        }
        if let Some(tag) = &exception.unserializable_value {
            return tag.clone();
        }
    }

    let mut message = details.text.clone();
    if let Some(stack_trace) = &details.stack_trace {
        for frame in &stack_trace.call_frames {
            let function = if frame.function_name.is_empty() {
                "<anonymous>"
            } else {
                frame.function_name.as_str()
            };
            message.push_str(&format!(
                "\n    at {} ({}:{}:{})",
                function, frame.url, frame.line_number, frame.column_number
            ));
        }
    }
    message
}

/// Build the structured error for a remote exception.
pub fn exception_to_error(details: &ExceptionDetails, caller_frame: Option<usize>) -> RemoteScriptError {
    let description = exception_description(details);
    let message = message_portion(&description)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string();
    let class_name = details
        .exception
        .as_ref()
        .and_then(|exception| exception.class_name.clone());

    RemoteScriptError {
        class_name,
        message,
        stack: parse_stack(&description),
        description,
        caller_frame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{CallFrame, RemoteObject, StackTrace};
    use serde_json::json;

    fn transport(message: &str) -> TransportError {
        TransportError::new("Runtime.callFunctionOn", message)
    }

    #[test]
    fn test_context_not_found_is_destroyed() {
        assert_eq!(
            rewrite_transport_error(transport(
                "Protocol error (Runtime.callFunctionOn): Cannot find context with specified id"
            )),
            Rewrite::ContextDestroyed
        );
        assert_eq!(
            rewrite_transport_error(transport("Inspected target navigated or closed")),
            Rewrite::ContextDestroyed
        );
    }

    #[test]
    fn test_context_phrase_must_be_a_suffix() {
        let err = transport("Cannot find context with specified id (retrying)");
        assert_eq!(rewrite_transport_error(err.clone()), Rewrite::Passthrough(err));
    }

    #[test]
    fn test_unreturnable_values_are_empty_success() {
        assert_eq!(
            rewrite_transport_error(transport("Object reference chain is too long")),
            Rewrite::EmptySuccess
        );
        assert_eq!(
            rewrite_transport_error(transport(
                "Runtime.evaluate: Object couldn't be returned by value, please retry"
            )),
            Rewrite::EmptySuccess
        );
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = transport("Target closed.");
        assert_eq!(rewrite_transport_error(err.clone()), Rewrite::Passthrough(err));
    }

    #[test]
    fn test_circular_structure_hint() {
        let annotated =
            annotate_circular_structure(&transport("Converting circular structure to JSON")).unwrap();
        assert_eq!(
            annotated.message,
            "Converting circular structure to JSON Are you passing a nested JSHandle?"
        );
        assert!(annotate_circular_structure(&transport("Target closed.")).is_none());
    }

    #[test]
    fn test_exception_with_description() {
        let details = ExceptionDetails {
            text: "Uncaught".into(),
            exception: Some(RemoteObject {
                kind: "object".into(),
                subtype: Some("error".into()),
                class_name: Some("TypeError".into()),
                description: Some(
                    "TypeError: x.foo is not a function\n    at run (__pagebridge_evaluation_script__:2:5)\n    at app.js:10:1"
                        .into(),
                ),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = exception_to_error(&details, Some(2));
        assert_eq!(err.class_name.as_deref(), Some("TypeError"));
        assert_eq!(err.message, "TypeError: x.foo is not a function");
        assert_eq!(err.stack.len(), 2);
        assert_eq!(err.stack[0].function.as_deref(), Some("run"));
        assert_eq!(err.caller_frame, Some(2));

        let user: Vec<_> = err.user_frames().collect();
        assert_eq!(user.len(), 1);
        assert_eq!(user[0].file.as_deref(), Some("app.js"));
    }

    #[test]
    fn test_thrown_primitive_uses_value() {
        let details = ExceptionDetails {
            text: "Uncaught".into(),
            exception: Some(RemoteObject {
                kind: "number".into(),
                value: Some(json!(42)),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = exception_to_error(&details, None);
        assert_eq!(err.class_name, None);
        assert_eq!(err.description, "42");
        assert_eq!(err.message, "42");
        assert!(err.stack.is_empty());
    }

    #[test]
    fn test_description_synthesized_from_call_frames() {
        let details = ExceptionDetails {
            text: "Uncaught SyntaxError: Unexpected token".into(),
            stack_trace: Some(StackTrace {
                description: None,
                call_frames: vec![
                    CallFrame {
                        function_name: String::new(),
                        url: "page.js".into(),
                        line_number: 3,
                        column_number: 7,
                        ..Default::default()
                    },
                    CallFrame {
                        function_name: "outer".into(),
                        url: "page.js".into(),
                        line_number: 9,
                        column_number: 1,
                        ..Default::default()
                    },
                ],
            }),
            ..Default::default()
        };
        let err = exception_to_error(&details, None);
        assert_eq!(
            err.description,
            "Uncaught SyntaxError: Unexpected token\n    at <anonymous> (page.js:3:7)\n    at outer (page.js:9:1)"
        );
        assert_eq!(err.message, "Uncaught SyntaxError: Unexpected token");
        assert_eq!(err.stack.len(), 2);
        assert_eq!(err.stack[0].function.as_deref(), Some("<anonymous>"));
        assert_eq!(err.stack[1].line, Some(9));
    }
}
