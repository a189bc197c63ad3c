//! Evaluation entry point.
//!
//! A call moves through `Building → Sent → {Succeeded | Failed}`:
//!
//! - **Building**: the program is encoded and every argument marshalled, in
//!   order. Any failure here returns before the channel is touched.
//! - **Sent**: one command is sent and awaited. This is the only suspension
//!   point.
//! - **Succeeded / Failed**: the response is decoded, or the exception payload
//!   or transport failure is translated.
//!
//! Nothing is retried.

use crate::channel::CommandChannel;
use crate::config::EvaluateOptions;
use crate::error::TransportError;
use crate::handle::JsHandle;
use crate::marshal::{self, EvalArg, JsValue};
use crate::program::{self, EncodedProgram, Program};
use crate::protocol::{
    CallFunctionOnParams, Command, CommandOutcome, ContextId, EvaluateParams, RemoteObject,
};
use crate::translate::{self, Rewrite};
use crate::{BridgeError, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs programs in remote execution contexts over a [`CommandChannel`].
///
/// Holds no per-call state; clones share the channel and may be used
/// concurrently from any number of tasks.
pub struct ScriptBridge<C> {
    channel: Arc<C>,
}

impl<C> Clone for ScriptBridge<C> {
    fn clone(&self) -> Self {
        Self {
            channel: Arc::clone(&self.channel),
        }
    }
}

impl<C: CommandChannel> ScriptBridge<C> {
    pub fn new(channel: Arc<C>) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &Arc<C> {
        &self.channel
    }

    /// Bind the bridge to one execution context.
    pub fn context(&self, id: ContextId) -> ExecutionContext<C> {
        ExecutionContext {
            bridge: self.clone(),
            id,
        }
    }

    /// Evaluate `program` in `context` and return its value.
    pub async fn evaluate(
        &self,
        context: ContextId,
        program: &Program,
        args: &[EvalArg<'_>],
    ) -> Result<JsValue> {
        self.evaluate_with(context, program, args, &EvaluateOptions::default())
            .await
    }

    /// Like [`evaluate`](Self::evaluate) with explicit flags.
    ///
    /// The result is always requested by value.
    pub async fn evaluate_with(
        &self,
        context: ContextId,
        program: &Program,
        args: &[EvalArg<'_>],
        options: &EvaluateOptions,
    ) -> Result<JsValue> {
        let options = EvaluateOptions {
            return_by_value: true,
            ..options.clone()
        };
        let object = self.invoke(context, program, args, &options).await?;
        marshal::decode_remote_object(&object)
    }

    /// Evaluate `program` and return a handle to the result object.
    pub async fn evaluate_handle(
        &self,
        context: ContextId,
        program: &Program,
        args: &[EvalArg<'_>],
    ) -> Result<JsHandle> {
        let options = EvaluateOptions::default().by_reference();
        let object = self.invoke(context, program, args, &options).await?;
        Ok(JsHandle::new(context, object))
    }

    async fn invoke(
        &self,
        context: ContextId,
        program: &Program,
        args: &[EvalArg<'_>],
        options: &EvaluateOptions,
    ) -> Result<RemoteObject> {
        let command = build_command(context, program, args, options)?;
        let method = command.method();
        let params = command.to_params()?;

        debug!("Sending {} to context {}", method, context);

        let response = match self.channel.send(method, params).await {
            Ok(response) => response,
            Err(err) => return recover_transport_error(&command, err),
        };

        match CommandOutcome::from_response(response)? {
            CommandOutcome::Success(object) => Ok(object),
            CommandOutcome::Failure(details) => {
                let err = translate::exception_to_error(&details, options.caller_frame);
                debug!("Evaluation in context {} threw: {}", context, err.message);
                Err(err.into())
            }
        }
    }
}

/// Encode the program and arguments into the command for this call shape.
fn build_command(
    context: ContextId,
    program: &Program,
    args: &[EvalArg<'_>],
    options: &EvaluateOptions,
) -> Result<Command> {
    match program::encode(program)? {
        EncodedProgram::Expression(expression) => {
            if !args.is_empty() {
                return Err(BridgeError::Validation {
                    field: "args".to_string(),
                    message: format!(
                        "expressions take no arguments, got {}; pass a function instead",
                        args.len()
                    ),
                });
            }
            Ok(Command::Evaluate(EvaluateParams {
                expression,
                context_id: context,
                return_by_value: options.return_by_value,
                await_promise: options.await_promise,
                user_gesture: options.user_gesture,
            }))
        }
        EncodedProgram::FunctionDeclaration(function_declaration) => {
            let arguments = marshal::encode_arguments(args, context)?;
            Ok(Command::CallFunctionOn(CallFunctionOnParams {
                function_declaration,
                execution_context_id: context,
                arguments,
                return_by_value: options.return_by_value,
                await_promise: options.await_promise,
                user_gesture: options.user_gesture,
            }))
        }
    }
}

fn recover_transport_error(command: &Command, err: TransportError) -> Result<RemoteObject> {
    if let Command::CallFunctionOn(_) = command {
        if let Some(annotated) = translate::annotate_circular_structure(&err) {
            return Err(annotated.into());
        }
    }

    match translate::rewrite_transport_error(err) {
        Rewrite::EmptySuccess => {
            debug!("{} result could not be serialized, returning undefined", command.method());
            Ok(RemoteObject::undefined())
        }
        Rewrite::ContextDestroyed => {
            warn!("Execution context destroyed during {}", command.method());
            Err(BridgeError::ExecutionContextDestroyed)
        }
        Rewrite::Passthrough(err) => Err(err.into()),
    }
}

/// A [`ScriptBridge`] bound to one execution context.
pub struct ExecutionContext<C> {
    bridge: ScriptBridge<C>,
    id: ContextId,
}

impl<C: CommandChannel> ExecutionContext<C> {
    pub fn id(&self) -> ContextId {
        self.id
    }

    pub async fn evaluate(&self, program: &Program, args: &[EvalArg<'_>]) -> Result<JsValue> {
        self.bridge.evaluate(self.id, program, args).await
    }

    pub async fn evaluate_with(
        &self,
        program: &Program,
        args: &[EvalArg<'_>],
        options: &EvaluateOptions,
    ) -> Result<JsValue> {
        self.bridge.evaluate_with(self.id, program, args, options).await
    }

    pub async fn evaluate_handle(&self, program: &Program, args: &[EvalArg<'_>]) -> Result<JsHandle> {
        self.bridge.evaluate_handle(self.id, program, args).await
    }
}
