//! JSON argument parsing helpers for capability calls and local handlers.
//!
//! ```rust
//! use ltooling::{parse_arguments, required_string};
//!
//! let args = parse_arguments(r#"{"path":"x.txt"}"#).expect("object should parse");
//! let path = required_string(&args, "path").expect("path should be present");
//! assert_eq!(path, "x.txt");
//! ```

use serde_json::{Map, Value};

use crate::CapabilityError;

/// Parses the raw argument text of a capability call into an argument map.
///
/// `null` is accepted as "no arguments"; anything else that is not a JSON object is rejected.
pub fn parse_arguments(raw: &str) -> Result<Map<String, Value>, CapabilityError> {
    let value: Value = serde_json::from_str(raw).map_err(|err| {
        CapabilityError::invalid_arguments(format!("invalid JSON arguments: {err}"))
    })?;

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(CapabilityError::invalid_arguments(format!(
            "expected JSON object arguments, got {}",
            json_type_name(&other)
        ))),
    }
}

pub fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, CapabilityError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| {
            CapabilityError::invalid_arguments(format!("missing required string: '{key}'"))
        })
}

pub fn optional_string(args: &Map<String, Value>, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(ToString::to_string)
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
