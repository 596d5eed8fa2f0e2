//! Value classification used to pick a comparison rule.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Primitive,
    Object,
    Array,
    /// A key that is absent from the data.
    Undefined,
}

impl Kind {
    pub fn of(value: Option<&Value>) -> Self {
        match value {
            None => Kind::Undefined,
            Some(Value::Object(_)) => Kind::Object,
            Some(Value::Array(_)) => Kind::Array,
            Some(_) => Kind::Primitive,
        }
    }
}

/// Type name reported in mismatch messages.
pub fn type_tag(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

pub fn is_empty_object(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.is_empty())
}
