//! Remote object handles.
//!
//! A handle refers to an object living in the remote context. The component
//! that created it owns it and decides when it is disposed; the bridge only
//! borrows handles and reads their state when marshalling arguments.

use crate::protocol::{ContextId, RemoteObject};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What the bridge needs to know about a handle passed as an argument.
pub trait RemoteHandle: Send + Sync {
    /// Whether the owner has released the remote object.
    fn is_disposed(&self) -> bool;

    /// Context the handle was created in.
    fn context_id(&self) -> ContextId;

    fn remote_object_id(&self) -> Option<&str>;

    fn unserializable_value(&self) -> Option<&str>;

    fn plain_value(&self) -> Option<&Value>;
}

/// Handle backed by a [`RemoteObject`] description.
///
/// Clones share the disposed flag, so disposing any clone is observed by all.
#[derive(Debug, Clone)]
pub struct JsHandle {
    context_id: ContextId,
    remote_object: RemoteObject,
    disposed: Arc<AtomicBool>,
}

impl JsHandle {
    pub fn new(context_id: ContextId, remote_object: RemoteObject) -> Self {
        Self {
            context_id,
            remote_object,
            disposed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn remote_object(&self) -> &RemoteObject {
        &self.remote_object
    }

    /// Mark the handle disposed. Releasing the remote object is up to the owner.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }
}

impl RemoteHandle for JsHandle {
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn context_id(&self) -> ContextId {
        self.context_id
    }

    fn remote_object_id(&self) -> Option<&str> {
        self.remote_object.object_id.as_deref()
    }

    fn unserializable_value(&self) -> Option<&str> {
        self.remote_object.unserializable_value.as_deref()
    }

    fn plain_value(&self) -> Option<&Value> {
        self.remote_object.value.as_ref()
    }
}
