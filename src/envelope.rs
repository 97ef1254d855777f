use crate::fault::Fault;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The decoded request: a method name plus named parameters.
///
/// Parameter keys are unique and their order on the wire is irrelevant;
/// positional order comes from the method's declared specs, not from here.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestEnvelope {
    pub method: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// The outgoing response: headers plus exactly one of result or fault.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResponseEnvelope {
    pub headers: Map<String, Value>,
    #[serde(flatten)]
    pub body: ResponseBody,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseBody {
    Result(Value),
    Fault(Fault),
}

impl ResponseEnvelope {
    pub fn result(headers: Map<String, Value>, result: Value) -> Self {
        Self {
            headers,
            body: ResponseBody::Result(result),
        }
    }

    pub fn fault(headers: Map<String, Value>, fault: Fault) -> Self {
        Self {
            headers,
            body: ResponseBody::Fault(fault),
        }
    }
}
