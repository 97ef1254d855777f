//! A minimal RPC request dispatcher.
//!
//! One call to [`Dispatcher::dispatch`] takes raw request bytes through the
//! full cycle: decode the envelope, resolve the method against the service's
//! registry, bind and cast parameters, invoke the handler between the
//! lifecycle hooks, and encode a result or fault envelope. Everything the
//! framework detects itself (empty input, undecodable input, unknown
//! methods, missing parameters) comes back as a fault in the reserved
//! negative code range; handlers return their own faults with any other
//! code.
//!
//! ```
//! use rpcdispatch::{Coercion, Dispatcher, MethodDescriptor, MethodTable, RpcService};
//! use serde_json::{json, Value};
//!
//! struct Calculator {
//!     methods: MethodTable,
//! }
//!
//! impl Calculator {
//!     fn new() -> Self {
//!         let mut methods = MethodTable::new();
//!         methods.insert(
//!             "add",
//!             MethodDescriptor::new(|args: Vec<Value>| async move {
//!                 Ok(json!(args[0].as_i64().unwrap_or(0) + args[1].as_i64().unwrap_or(0)))
//!             })
//!             .param("a", Coercion::Int)
//!             .param("b", Coercion::Int)
//!             .returns(Coercion::Int),
//!         );
//!         Self { methods }
//!     }
//! }
//!
//! impl RpcService for Calculator {
//!     fn resolve(&self, method: &str) -> Option<&MethodDescriptor> {
//!         self.methods.resolve(method)
//!     }
//! }
//!
//! # futures::executor::block_on(async {
//! let dispatcher = Dispatcher::new();
//! let raw = br#"{"method":"add","parameters":{"a":"2","b":"3"}}"#;
//! let response = dispatcher.dispatch(&Calculator::new(), raw).await.unwrap();
//! let response: Value = serde_json::from_slice(&response).unwrap();
//! assert_eq!(response["result"], json!(5));
//! # });
//! ```

pub mod binder;
pub mod codec;
pub mod dispatcher;
pub mod envelope;
pub mod fault;
pub mod invoker;
pub mod registry;
pub mod types;

pub use codec::{Codec, CodecError};
pub use dispatcher::{DispatchContext, Dispatcher};
pub use envelope::{RequestEnvelope, ResponseBody, ResponseEnvelope};
pub use fault::{DispatchError, Fault};
pub use registry::{HandlerResult, MethodDescriptor, MethodInfo, MethodTable, ParamSpec};
pub use types::{cast, Coercion, ParamFlags, Presence};

/// The collaborator contract the dispatcher requires from a service.
///
/// [`resolve`](RpcService::resolve) supplies method metadata and is queried
/// fresh per request. The remaining hooks default to no-ops; implement them
/// for per-request headers, result rewriting, or fault logging.
pub trait RpcService {
    /// Yields the descriptor for a method name, or `None` if the service
    /// does not export it.
    fn resolve(&self, method: &str) -> Option<&MethodDescriptor>;

    /// Runs before every invocation. The return value is ignored.
    fn pre_process(&self, _cx: &mut DispatchContext) {}

    /// Runs after every invocation that produced an outcome, before the
    /// fault check and return cast. May mutate the outcome in place.
    fn post_process(&self, _outcome: &mut HandlerResult) {}

    /// Runs once per outgoing fault, after the response envelope is built
    /// and before it is encoded.
    fn fault_callback(&self, _fault: &Fault, _is_internal: bool) {}
}
