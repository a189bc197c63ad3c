//! Wire types for the remote runtime commands.
//!
//! Two commands are issued: `Runtime.evaluate` for expressions and
//! `Runtime.callFunctionOn` for function declarations with arguments. Both
//! answer with the same response shape, which is validated into a
//! [`CommandOutcome`] before anything else looks at it.

use crate::config::EvaluationConfig;
use crate::{BridgeError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of an execution context in the remote process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(pub i64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ContextId {
    fn from(id: i64) -> Self {
        ContextId(id)
    }
}

/// Keeps an explicit `null` distinct from an absent field.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Mirror of a remote object as described by the remote runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    /// Object type (`object`, `number`, `bigint`, `undefined`, ...).
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unserializable_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

impl RemoteObject {
    /// The `undefined` remote value.
    pub fn undefined() -> Self {
        Self {
            kind: "undefined".to_string(),
            ..Self::default()
        }
    }
}

/// One argument of `Runtime.callFunctionOn`.
///
/// Exactly one field is present on the wire; an argument with no fields is
/// read as `undefined` by the remote side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CallArgument {
    Value {
        value: Value,
    },
    Unserializable {
        #[serde(rename = "unserializableValue")]
        unserializable_value: String,
    },
    ObjectRef {
        #[serde(rename = "objectId")]
        object_id: String,
    },
    Undefined {},
}

impl CallArgument {
    pub fn unserializable(tag: impl Into<String>) -> Self {
        CallArgument::Unserializable {
            unserializable_value: tag.into(),
        }
    }

    /// True if this argument references a remote object.
    pub fn is_object_ref(&self) -> bool {
        matches!(self, CallArgument::ObjectRef { .. })
    }
}

/// Frame of a remote stack trace as reported by the runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    #[serde(default)]
    pub function_name: String,
    #[serde(default)]
    pub script_id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub line_number: i64,
    #[serde(default)]
    pub column_number: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTrace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub call_frames: Vec<CallFrame>,
}

/// Exception payload attached to a failed evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    #[serde(default)]
    pub exception_id: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub line_number: i64,
    #[serde(default)]
    pub column_number: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<StackTrace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<RemoteObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_context_id: Option<ContextId>,
}

/// Parameters of `Runtime.evaluate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateParams {
    pub expression: String,
    pub context_id: ContextId,
    pub return_by_value: bool,
    pub await_promise: bool,
    pub user_gesture: bool,
}

/// Parameters of `Runtime.callFunctionOn`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFunctionOnParams {
    pub function_declaration: String,
    pub execution_context_id: ContextId,
    pub arguments: Vec<CallArgument>,
    pub return_by_value: bool,
    pub await_promise: bool,
    pub user_gesture: bool,
}

/// A command ready to be handed to the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Evaluate(EvaluateParams),
    CallFunctionOn(CallFunctionOnParams),
}

impl Command {
    /// Protocol method name.
    pub fn method(&self) -> &'static str {
        match self {
            Command::Evaluate(_) => EvaluationConfig::EVALUATE_METHOD,
            Command::CallFunctionOn(_) => EvaluationConfig::CALL_FUNCTION_ON_METHOD,
        }
    }

    /// Serialize the parameters object.
    pub fn to_params(&self) -> Result<Value> {
        let params = match self {
            Command::Evaluate(params) => serde_json::to_value(params)?,
            Command::CallFunctionOn(params) => serde_json::to_value(params)?,
        };
        Ok(params)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResponse {
    #[serde(default)]
    result: Option<RemoteObject>,
    #[serde(default)]
    exception_details: Option<ExceptionDetails>,
}

/// Validated response of an evaluation command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Success(RemoteObject),
    Failure(ExceptionDetails),
}

impl CommandOutcome {
    /// Validate a raw response value.
    ///
    /// An exception payload wins over a result; a response with neither is a
    /// protocol error.
    pub fn from_response(response: Value) -> Result<Self> {
        let raw: RawResponse = serde_json::from_value(response)?;
        match (raw.exception_details, raw.result) {
            (Some(details), _) => Ok(CommandOutcome::Failure(details)),
            (None, Some(result)) => Ok(CommandOutcome::Success(result)),
            (None, None) => Err(BridgeError::Protocol {
                message: "Response carries neither a result nor exception details".to_string(),
                source: None,
            }),
        }
    }
}
