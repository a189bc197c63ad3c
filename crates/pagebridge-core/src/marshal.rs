//! Value marshalling between caller values and the wire.
//!
//! The generic `value` field only carries JSON, which cannot express big
//! integers, negative zero, NaN or the infinities. Those travel as an
//! `unserializableValue` tag in both directions.

use crate::handle::RemoteHandle;
use crate::protocol::{CallArgument, ContextId, RemoteObject};
use crate::{BridgeError, Result};
use num_bigint::BigInt;
use serde_json::{Number, Value};
use std::fmt;

const NEGATIVE_ZERO: &str = "-0";
const NAN: &str = "NaN";
const INFINITY: &str = "Infinity";
const NEGATIVE_INFINITY: &str = "-Infinity";

/// A value as seen by the caller on either side of a call.
#[derive(Debug, Clone, PartialEq)]
pub enum JsValue {
    /// No value (`undefined` remotely).
    Undefined,
    /// Anything JSON can carry.
    Json(Value),
    BigInt(BigInt),
    NegativeZero,
    NaN,
    Infinity,
    NegativeInfinity,
}

fn is_negative_zero(value: f64) -> bool {
    value.to_bits() == (-0.0f64).to_bits()
}

impl JsValue {
    /// Numeric view of the value, recovering the special floats bit-exactly.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JsValue::Json(Value::Number(n)) => n.as_f64(),
            JsValue::NegativeZero => Some(-0.0),
            JsValue::NaN => Some(f64::NAN),
            JsValue::Infinity => Some(f64::INFINITY),
            JsValue::NegativeInfinity => Some(f64::NEG_INFINITY),
            _ => None,
        }
    }

    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            JsValue::BigInt(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            JsValue::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, JsValue::Undefined)
    }

    /// Wire tag for values JSON cannot carry, `None` for everything else.
    pub fn unserializable_tag(&self) -> Option<String> {
        match self {
            JsValue::BigInt(n) => Some(format!("{}n", n)),
            JsValue::NegativeZero => Some(NEGATIVE_ZERO.to_string()),
            JsValue::NaN => Some(NAN.to_string()),
            JsValue::Infinity => Some(INFINITY.to_string()),
            JsValue::NegativeInfinity => Some(NEGATIVE_INFINITY.to_string()),
            JsValue::Json(Value::Number(n)) if n.as_f64().is_some_and(is_negative_zero) => {
                Some(NEGATIVE_ZERO.to_string())
            }
            JsValue::Undefined | JsValue::Json(_) => None,
        }
    }
}

impl From<f64> for JsValue {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            JsValue::NaN
        } else if value == f64::INFINITY {
            JsValue::Infinity
        } else if value == f64::NEG_INFINITY {
            JsValue::NegativeInfinity
        } else if is_negative_zero(value) {
            JsValue::NegativeZero
        } else {
            Number::from_f64(value).map_or(JsValue::NaN, |n| JsValue::Json(Value::Number(n)))
        }
    }
}

impl From<i64> for JsValue {
    fn from(value: i64) -> Self {
        JsValue::Json(Value::from(value))
    }
}

impl From<bool> for JsValue {
    fn from(value: bool) -> Self {
        JsValue::Json(Value::Bool(value))
    }
}

impl From<&str> for JsValue {
    fn from(value: &str) -> Self {
        JsValue::Json(Value::String(value.to_string()))
    }
}

impl From<String> for JsValue {
    fn from(value: String) -> Self {
        JsValue::Json(Value::String(value))
    }
}

impl From<BigInt> for JsValue {
    fn from(value: BigInt) -> Self {
        JsValue::BigInt(value)
    }
}

impl From<Value> for JsValue {
    fn from(value: Value) -> Self {
        JsValue::Json(value)
    }
}

impl fmt::Display for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "undefined"),
            JsValue::Json(value) => write!(f, "{}", value),
            other => match other.unserializable_tag() {
                Some(tag) => write!(f, "{}", tag),
                None => Ok(()),
            },
        }
    }
}

/// One argument of a function invocation.
#[derive(Clone)]
pub enum EvalArg<'a> {
    Value(JsValue),
    /// Borrowed handle; the bridge never takes ownership.
    Handle(&'a dyn RemoteHandle),
}

impl<'a> EvalArg<'a> {
    pub fn handle(handle: &'a dyn RemoteHandle) -> Self {
        EvalArg::Handle(handle)
    }
}

impl<'a> fmt::Debug for EvalArg<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalArg::Value(value) => f.debug_tuple("Value").field(value).finish(),
            EvalArg::Handle(handle) => f
                .debug_struct("Handle")
                .field("context_id", &handle.context_id())
                .field("object_id", &handle.remote_object_id())
                .field("disposed", &handle.is_disposed())
                .finish(),
        }
    }
}

impl<'a> From<JsValue> for EvalArg<'a> {
    fn from(value: JsValue) -> Self {
        EvalArg::Value(value)
    }
}

impl<'a> From<Value> for EvalArg<'a> {
    fn from(value: Value) -> Self {
        EvalArg::Value(JsValue::Json(value))
    }
}

impl<'a> From<&'a crate::handle::JsHandle> for EvalArg<'a> {
    fn from(handle: &'a crate::handle::JsHandle) -> Self {
        EvalArg::Handle(handle)
    }
}

/// Encode a plain caller value.
///
/// Sentinels are checked before the generic JSON path.
pub fn encode_value(value: &JsValue) -> CallArgument {
    if let Some(tag) = value.unserializable_tag() {
        return CallArgument::unserializable(tag);
    }
    match value {
        JsValue::Json(value) => CallArgument::Value {
            value: value.clone(),
        },
        _ => CallArgument::Undefined {},
    }
}

/// Encode a handle argument.
///
/// The disposed flag is read here, immediately before the argument is built.
pub fn encode_handle(handle: &dyn RemoteHandle, target: ContextId) -> Result<CallArgument> {
    if handle.is_disposed() {
        return Err(BridgeError::HandleDisposed);
    }
    if handle.context_id() != target {
        return Err(BridgeError::HandleContextMismatch {
            handle: handle.context_id(),
            target,
        });
    }
    if let Some(tag) = handle.unserializable_value() {
        return Ok(CallArgument::unserializable(tag));
    }
    match handle.remote_object_id() {
        Some(object_id) => Ok(CallArgument::ObjectRef {
            object_id: object_id.to_string(),
        }),
        None => Ok(match handle.plain_value() {
            Some(value) => CallArgument::Value {
                value: value.clone(),
            },
            None => CallArgument::Undefined {},
        }),
    }
}

/// Encode one argument for a call targeting `target`.
pub fn encode_argument(arg: &EvalArg<'_>, target: ContextId) -> Result<CallArgument> {
    match arg {
        EvalArg::Value(value) => Ok(encode_value(value)),
        EvalArg::Handle(handle) => encode_handle(*handle, target),
    }
}

/// Encode all arguments in order, stopping at the first failure.
pub fn encode_arguments(args: &[EvalArg<'_>], target: ContextId) -> Result<Vec<CallArgument>> {
    args.iter().map(|arg| encode_argument(arg, target)).collect()
}

/// Decode an `unserializableValue` tag.
pub fn decode_unserializable(tag: &str) -> Result<JsValue> {
    match tag {
        NEGATIVE_ZERO => Ok(JsValue::NegativeZero),
        NAN => Ok(JsValue::NaN),
        INFINITY => Ok(JsValue::Infinity),
        NEGATIVE_INFINITY => Ok(JsValue::NegativeInfinity),
        _ => tag
            .strip_suffix('n')
            .and_then(|digits| digits.parse::<BigInt>().ok())
            .map(JsValue::BigInt)
            .ok_or_else(|| BridgeError::UnsupportedUnserializableValue(tag.to_string())),
    }
}

/// Decode a by-value remote object into a caller value.
pub fn decode_remote_object(object: &RemoteObject) -> Result<JsValue> {
    if object.object_id.is_some() {
        return Err(BridgeError::Protocol {
            message: "Cannot extract value when objectId is given".to_string(),
            source: None,
        });
    }
    if let Some(tag) = object.unserializable_value.as_deref() {
        return decode_unserializable(tag);
    }
    Ok(match &object.value {
        Some(value) => JsValue::Json(value.clone()),
        None => JsValue::Undefined,
    })
}
