//! Wire-format strategies for the request/response envelopes.
//!
//! Two strategies are registered: `json` (the default) parses and renders
//! envelopes with `serde_json`; `raw` is a passthrough for callers that
//! pre-render their payloads. The active strategy is selected by name and
//! resolved at encode/decode time, so a misconfigured name only surfaces
//! when a request is actually served.

use crate::envelope::{RequestEnvelope, ResponseBody, ResponseEnvelope};
use serde_json::Value;
use thiserror::Error;

pub const JSON: &str = "json";
pub const RAW: &str = "raw";

#[derive(Debug, Error)]
pub enum CodecError {
    /// The configured strategy name is not registered.
    #[error("unknown wire format '{0}'")]
    UnknownFormat(String),

    /// The input did not parse into a method plus parameters.
    #[error("malformed request: {0}")]
    Json(#[from] serde_json::Error),

    /// Raw payloads carry no envelope to recover.
    #[error("raw payload does not contain a request envelope")]
    RawEnvelope,
}

impl CodecError {
    /// True for the configuration error, as opposed to a bad request.
    pub fn is_configuration(&self) -> bool {
        matches!(self, CodecError::UnknownFormat(_))
    }
}

#[derive(Debug, Clone)]
pub struct Codec {
    format: String,
}

impl Codec {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn decode(&self, raw: &[u8]) -> Result<RequestEnvelope, CodecError> {
        match self.format.as_str() {
            JSON => Ok(serde_json::from_slice(raw)?),
            RAW => Err(CodecError::RawEnvelope),
            other => Err(CodecError::UnknownFormat(other.to_owned())),
        }
    }

    /// Never fails for a well-formed envelope under a registered strategy.
    pub fn encode(&self, envelope: &ResponseEnvelope) -> Result<Vec<u8>, CodecError> {
        match self.format.as_str() {
            JSON => Ok(serde_json::to_vec(envelope)?),
            RAW => Ok(encode_raw(envelope)),
            other => Err(CodecError::UnknownFormat(other.to_owned())),
        }
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(JSON)
    }
}

// String results pass through byte-for-byte; everything else renders as
// compact JSON text. Headers are dropped, raw is a body-only strategy.
fn encode_raw(envelope: &ResponseEnvelope) -> Vec<u8> {
    match &envelope.body {
        ResponseBody::Result(Value::String(s)) => s.clone().into_bytes(),
        ResponseBody::Result(value) => value.to_string().into_bytes(),
        ResponseBody::Fault(fault) => fault.message.clone().into_bytes(),
    }
}
