use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Whether a declared parameter must be supplied by the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum Presence {
    #[default]
    Required,
    Optional,
}

/// How a raw parameter (or return) value is converted before use.
///
/// `Object` and `String` are pass-through tags: the value is handed to the
/// target unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Coercion {
    Int,
    Bool,
    Float,
    Object,
    String,
}

impl Coercion {
    fn name(&self) -> &'static str {
        use Coercion::*;
        match self {
            Int => "Int",
            Bool => "Bool",
            Float => "Float",
            Object => "Object",
            String => "String",
        }
    }
}

impl fmt::Display for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-parameter flags: exactly one presence tag, at most one coercion tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ParamFlags {
    pub presence: Presence,
    pub coercion: Option<Coercion>,
}

impl ParamFlags {
    pub fn required(coercion: Coercion) -> Self {
        Self {
            presence: Presence::Required,
            coercion: Some(coercion),
        }
    }

    pub fn optional(coercion: Coercion) -> Self {
        Self {
            presence: Presence::Optional,
            coercion: Some(coercion),
        }
    }

    pub fn is_optional(&self) -> bool {
        self.presence == Presence::Optional
    }
}

impl From<Coercion> for ParamFlags {
    fn from(coercion: Coercion) -> Self {
        Self::required(coercion)
    }
}

/// Converts `value` according to the coercion tag in `flags`.
///
/// Conversions are total and idempotent: every JSON value maps to some value
/// of the tagged type, and re-casting the result is a no-op. Strings parse
/// leniently (`"2"` casts to `2`); unparseable strings cast to zero.
pub fn cast(value: Value, flags: ParamFlags) -> Value {
    match flags.coercion {
        Some(Coercion::Int) => Value::from(to_i64(&value)),
        Some(Coercion::Bool) => Value::Bool(to_bool(&value)),
        Some(Coercion::Float) => Value::from(to_f64(&value)),
        // No casting for objects or strings.
        Some(Coercion::Object) | Some(Coercion::String) | None => value,
    }
}

fn to_i64(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => *b as i64,
        Value::Number(n) => n.as_i64().unwrap_or_else(|| {
            // Floats (and out-of-range u64) truncate toward zero.
            n.as_f64().map(|f| f as i64).unwrap_or(0)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
                .unwrap_or(0)
        }
        Value::Array(items) => !items.is_empty() as i64,
        Value::Object(_) => 1,
    }
}

fn to_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

fn to_f64(value: &Value) -> f64 {
    let f = match value {
        Value::Null => 0.0,
        Value::Bool(b) => *b as i64 as f64,
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Array(items) => !items.is_empty() as i64 as f64,
        Value::Object(_) => 1.0,
    };
    // JSON numbers cannot carry NaN or infinity.
    if f.is_finite() {
        f
    } else {
        0.0
    }
}
