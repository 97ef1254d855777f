//! Runs a resolved method: pre-hook, positional call, post-hook, return cast.

use crate::dispatcher::DispatchContext;
use crate::fault::Fault;
use crate::registry::{HandlerResult, MethodDescriptor};
use crate::types::cast;
use crate::RpcService;
use futures::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;

/// Invokes `descriptor` with the bound `arguments`.
///
/// The pre-hook runs first and its return value is ignored. The target's
/// outcome then passes through the post-hook, which may mutate it in place.
/// A fault outcome is returned as-is, skipping return-type casting; a
/// success value is cast by the descriptor's return flags.
///
/// A panicking handler is caught here and wrapped as the default fault with
/// the panic payload as details; the post-hook is skipped in that case
/// since no outcome exists to mutate.
pub async fn invoke<S>(
    descriptor: &MethodDescriptor,
    arguments: Vec<Value>,
    service: &S,
    cx: &mut DispatchContext,
) -> HandlerResult
where
    S: RpcService + ?Sized,
{
    debug_assert_eq!(arguments.len(), descriptor.params.len());

    service.pre_process(cx);

    let call = AssertUnwindSafe(descriptor.call(arguments)).catch_unwind();
    let mut outcome = match call.await {
        Ok(outcome) => outcome,
        Err(panic) => {
            let message = panic_message(panic);
            tracing::warn!(panic = %message, "handler panicked");
            return Err(Fault::unknown(Value::String(message)));
        }
    };

    service.post_process(&mut outcome);

    match outcome {
        Err(fault) => Err(fault),
        Ok(value) => Ok(cast(value, descriptor.returns)),
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_owned()
    }
}
