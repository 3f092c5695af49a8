//! Small convenience constructors for common types.

use serde_json::Value;

use crate::{
    CapabilityCall, CapabilityDescriptor, CapabilityError, CapabilityOutput, ChatPolicy, Message,
};

pub fn system_message(content: impl Into<String>) -> Message {
    Message::system(content)
}

pub fn user_message(content: impl Into<String>) -> Message {
    Message::user(content)
}

pub fn assistant_message(content: impl Into<String>) -> Message {
    Message::assistant(content)
}

pub fn tool_message(call_id: impl Into<String>, content: impl Into<String>) -> Message {
    Message::tool(call_id, content)
}

pub fn capability_call(
    id: impl Into<String>,
    name: impl Into<String>,
    arguments: impl Into<String>,
) -> CapabilityCall {
    CapabilityCall::new(id, name, arguments)
}

/// Descriptor whose parameter schema is an object with the given string properties, all required.
pub fn string_capability(
    name: impl Into<String>,
    description: impl Into<String>,
    parameters: &[&str],
) -> CapabilityDescriptor {
    let properties: serde_json::Map<String, Value> = parameters
        .iter()
        .map(|parameter| {
            (
                (*parameter).to_string(),
                serde_json::json!({ "type": "string" }),
            )
        })
        .collect();

    CapabilityDescriptor::new(
        name,
        description,
        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": parameters,
        }),
    )
}

pub fn policy(model: impl Into<String>) -> ChatPolicy {
    ChatPolicy::new(model)
}

pub fn text_output(text: impl Into<String>) -> Result<CapabilityOutput, CapabilityError> {
    Ok(CapabilityOutput::text(text))
}

#[cfg(test)]
mod tests {
    use crate::Role;

    use super::{string_capability, tool_message, user_message};

    #[test]
    fn message_helpers_apply_expected_roles() {
        assert_eq!(user_message("hello").role(), Role::User);

        let tool = tool_message("call_1", "hello");
        assert_eq!(tool.role(), Role::Tool);
        assert_eq!(tool.tool_call_id(), Some("call_1"));
    }

    #[test]
    fn string_capability_requires_every_parameter() {
        let descriptor = string_capability("rename", "Renames a file", &["from", "to"]);

        assert_eq!(descriptor.required_parameters(), vec!["from", "to"]);
        assert_eq!(descriptor.parameters["properties"]["to"]["type"], "string");
    }
}
