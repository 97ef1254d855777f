//! Turns a request's named parameters into a positional argument list.

use crate::registry::ParamSpec;
use crate::types::cast;
use serde_json::{Map, Value};

/// The outcome of binding: the positional arguments, and every required
/// name the request failed to supply.
#[derive(Debug, Default)]
pub struct BoundArguments {
    pub arguments: Vec<Value>,
    pub missing: Vec<String>,
}

/// Walks the declared specs in order. A supplied parameter is cast by its
/// coercion tag and appended; an absent optional binds to null; an absent
/// required is recorded in `missing` and contributes no argument.
///
/// The caller must abort before invocation when `missing` is non-empty;
/// the full pass runs regardless so the fault can name every absentee.
pub fn bind(specs: &[ParamSpec], supplied: &Map<String, Value>) -> BoundArguments {
    let mut bound = BoundArguments::default();

    for spec in specs {
        if let Some(value) = supplied.get(&spec.name) {
            bound.arguments.push(cast(value.clone(), spec.flags));
        } else if spec.flags.is_optional() {
            bound.arguments.push(Value::Null);
        } else {
            bound.missing.push(spec.name.clone());
        }
    }

    bound
}
