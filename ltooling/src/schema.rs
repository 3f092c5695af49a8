//! Parameter schema normalization and boundary validation.
//!
//! Providers send schemas of varying quality. Before a descriptor reaches the model its schema is
//! forced into an `object` schema with a `properties` map, and the reserved identity parameter is
//! removed; the dispatcher injects that parameter itself.
//!
//! ```rust
//! use lprovider::CapabilityDescriptor;
//! use ltooling::normalize_descriptor;
//! use serde_json::json;
//!
//! let raw = CapabilityDescriptor::new(
//!     "read_file",
//!     "Reads a file",
//!     json!({"properties": {"path": {"type": "string"}, "uid": {"type": "string"}},
//!            "required": ["path", "uid"]}),
//! );
//!
//! let normalized = normalize_descriptor(raw, "uid");
//! assert_eq!(normalized.parameters["type"], "object");
//! assert!(normalized.parameters["properties"].get("uid").is_none());
//! assert_eq!(normalized.parameters["required"], json!(["path"]));
//! ```

use lprovider::CapabilityDescriptor;
use serde_json::{Map, Value, json};

use crate::CapabilityError;

pub const DEFAULT_IDENTITY_PARAMETER: &str = "uid";

pub fn normalize_schema(schema: Value, reserved: &str) -> Value {
    let mut object = match schema {
        Value::Object(object) => object,
        _ => return json!({"type": "object", "properties": {}}),
    };

    if object.get("type").and_then(Value::as_str) != Some("object") {
        object.insert("type".to_string(), Value::String("object".to_string()));
    }

    match object.get_mut("properties") {
        Some(Value::Object(properties)) => {
            properties.remove(reserved);
        }
        _ => {
            object.insert("properties".to_string(), Value::Object(Map::new()));
        }
    }

    match object.get_mut("required") {
        Some(Value::Array(required)) => {
            required.retain(|entry| entry.as_str() != Some(reserved));
        }
        Some(_) => {
            object.remove("required");
        }
        None => {}
    }

    Value::Object(object)
}

pub fn normalize_descriptor(descriptor: CapabilityDescriptor, reserved: &str) -> CapabilityDescriptor {
    CapabilityDescriptor {
        parameters: normalize_schema(descriptor.parameters, reserved),
        ..descriptor
    }
}

/// Checks parsed arguments against a normalized descriptor's `required` list.
pub fn validate_arguments(
    descriptor: &CapabilityDescriptor,
    arguments: &Map<String, Value>,
) -> Result<(), CapabilityError> {
    let missing: Vec<&str> = descriptor
        .required_parameters()
        .into_iter()
        .filter(|name| !arguments.contains_key(*name))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    Err(CapabilityError::invalid_arguments(format!(
        "missing required parameter(s): {}",
        missing.join(", ")
    ))
    .with_capability(descriptor.name.clone()))
}
