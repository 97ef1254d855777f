use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// An error response value, framework-detected or handler-returned.
///
/// Framework faults use the reserved codes below; handler code is free to
/// use any other code.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Error)]
#[error("{message} (code {code})")]
pub struct Fault {
    pub message: String,
    pub code: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl Fault {
    /// Fallback for errors the framework cannot classify.
    pub const ERR_DEFAULT: i64 = -10000;
    /// Empty or absent raw input.
    pub const ERR_REQUEST: i64 = -10001;
    /// Input that does not decode into a method plus parameters.
    pub const ERR_FORMAT: i64 = -10002;
    /// Method name the registry cannot resolve.
    pub const ERR_METHOD: i64 = -10003;
    /// One or more required parameters absent after binding.
    pub const ERR_PARAMETERS: i64 = -10004;

    pub fn new(message: impl Into<String>, code: i64) -> Self {
        Self {
            message: message.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(message: impl Into<String>, code: i64, details: Value) -> Self {
        Self {
            message: message.into(),
            code,
            details: Some(details),
        }
    }

    /// Wraps a value that escaped the handler without being a `Fault`.
    pub(crate) fn unknown(details: Value) -> Self {
        Self::with_details("Unknown error", Self::ERR_DEFAULT, details)
    }
}

/// Errors the dispatcher detects itself, before or independent of the
/// handler. Each converts to a [`Fault`] in the reserved code range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("Cannot accept an empty request.")]
    EmptyRequest,

    #[error("Unable to decode request.")]
    BadFormat,

    #[error("Method does not exist.")]
    UnknownMethod { method: String },

    #[error("Missing required parameter(s) '{}'.", names.join(", "))]
    MissingParameters { names: Vec<String> },
}

impl DispatchError {
    pub fn into_fault(self) -> Fault {
        let message = self.to_string();
        match self {
            DispatchError::EmptyRequest => Fault::new(message, Fault::ERR_REQUEST),
            DispatchError::BadFormat => Fault::new(message, Fault::ERR_FORMAT),
            DispatchError::UnknownMethod { method } => {
                Fault::with_details(message, Fault::ERR_METHOD, json!({ "method": method }))
            }
            DispatchError::MissingParameters { names } => Fault::with_details(
                message,
                Fault::ERR_PARAMETERS,
                json!({ "missingParameters": names }),
            ),
        }
    }
}
