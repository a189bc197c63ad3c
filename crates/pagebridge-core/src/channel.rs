//! Command channel seam.
//!
//! The bridge does not own a transport. Whatever carries commands to the
//! remote process implements [`CommandChannel`]; the bridge issues exactly one
//! `send` per call and awaits it.

use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Request/response primitive of the remote protocol.
#[async_trait]
pub trait CommandChannel: Send + Sync {
    /// Send `method` with `params` and return the raw result object.
    ///
    /// Rejections carry the channel's own wording; the bridge classifies
    /// them by message text.
    async fn send(&self, method: &str, params: Value) -> Result<Value, TransportError>;
}

#[async_trait]
impl<C: CommandChannel + ?Sized> CommandChannel for Arc<C> {
    async fn send(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        (**self).send(method, params).await
    }
}
