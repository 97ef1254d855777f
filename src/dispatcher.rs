//! Orchestrates one request→response cycle:
//! decode → resolve → bind → invoke → encode.

use crate::binder::bind;
use crate::codec::{Codec, CodecError};
use crate::envelope::ResponseEnvelope;
use crate::fault::{DispatchError, Fault};
use crate::invoker::invoke;
use crate::RpcService;
use serde_json::{Map, Value};

/// Per-call state visible to the service hooks, threaded through the
/// dispatch explicitly rather than held in shared state.
#[derive(Debug, Default)]
pub struct DispatchContext {
    pub response_headers: Map<String, Value>,
}

impl DispatchContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Drives the dispatch pipeline against a service.
///
/// Holds only the wire codec; `dispatch` takes `&self` and builds a fresh
/// [`DispatchContext`] per call, so one dispatcher may serve any number of
/// independent concurrent dispatches.
#[derive(Debug, Default, Clone)]
pub struct Dispatcher {
    codec: Codec,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the wire-format strategy by name. An unregistered name only
    /// fails once a request is served.
    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            codec: Codec::new(format),
        }
    }

    /// Serves one raw request and returns the encoded response bytes.
    ///
    /// Every request-level failure comes back as encoded fault bytes; the
    /// only `Err` is the configuration error for an unknown wire format,
    /// which by definition cannot encode a fault envelope.
    pub async fn dispatch<S>(&self, service: &S, raw: &[u8]) -> Result<Vec<u8>, CodecError>
    where
        S: RpcService + ?Sized,
    {
        let mut cx = DispatchContext::new();

        if raw.is_empty() {
            return self.send_fault(service, &cx, DispatchError::EmptyRequest.into_fault(), true);
        }

        let envelope = match self.codec.decode(raw) {
            Ok(envelope) => envelope,
            Err(err) if err.is_configuration() => return Err(err),
            Err(err) => {
                tracing::debug!(error = %err, "request failed to decode");
                return self.send_fault(service, &cx, DispatchError::BadFormat.into_fault(), true);
            }
        };
        if envelope.method.is_empty() {
            return self.send_fault(service, &cx, DispatchError::BadFormat.into_fault(), true);
        }

        tracing::debug!(method = %envelope.method, "dispatching request");

        let Some(descriptor) = service.resolve(&envelope.method) else {
            let fault = DispatchError::UnknownMethod {
                method: envelope.method,
            }
            .into_fault();
            return self.send_fault(service, &cx, fault, true);
        };

        let bound = bind(&descriptor.params, &envelope.parameters);
        if !bound.missing.is_empty() {
            let fault = DispatchError::MissingParameters {
                names: bound.missing,
            }
            .into_fault();
            return self.send_fault(service, &cx, fault, true);
        }

        match invoke(descriptor, bound.arguments, service, &mut cx).await {
            Ok(result) => {
                let envelope = ResponseEnvelope::result(cx.response_headers, result);
                self.codec.encode(&envelope)
            }
            Err(fault) => self.send_fault(service, &cx, fault, false),
        }
    }

    /// Builds the fault envelope, notifies the service, then encodes.
    /// The envelope is built before the callback runs, so callback-side
    /// mutations cannot alter what goes out on the wire.
    fn send_fault<S>(
        &self,
        service: &S,
        cx: &DispatchContext,
        fault: Fault,
        is_internal: bool,
    ) -> Result<Vec<u8>, CodecError>
    where
        S: RpcService + ?Sized,
    {
        tracing::warn!(code = fault.code, is_internal, "request faulted");
        let envelope = ResponseEnvelope::fault(cx.response_headers.clone(), fault.clone());
        service.fault_callback(&fault, is_internal);
        self.codec.encode(&envelope)
    }
}
