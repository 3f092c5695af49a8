//! Conversation message model and completion request types.
//!
//! ```rust
//! use lprovider::{CapabilityCall, CompletionRequest, Message, ProviderErrorKind, Role};
//!
//! let request = CompletionRequest::builder("gpt-4o-mini")
//!     .message(Message::system("You are helpful."))
//!     .message(Message::user("read x.txt"))
//!     .build()
//!     .expect("request should validate");
//! assert!(!request.parallel_capability_calls);
//!
//! let call = CapabilityCall::new("call_1", "read_file", r#"{"path":"x.txt"}"#);
//! let assistant = Message::assistant_calls(vec![call]);
//! assert_eq!(assistant.role(), Role::Assistant);
//!
//! let err = CompletionRequest::builder("").message(Message::user("hi")).build()
//!     .expect_err("empty model should fail");
//! assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
//! ```

use std::fmt::{Display, Formatter};

use lcommon::{GenerationOptions, MetadataMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let role = match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        };

        f.write_str(role)
    }
}

/// A capability invocation requested by the model.
///
/// `arguments` holds the raw argument text exactly as the model produced it; it is only parsed
/// when the call is executed, so malformed JSON survives until then.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl CapabilityCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capability_calls: Vec<CapabilityCall>,
}

impl AssistantMessage {
    pub fn new(content: impl Into<String>, capability_calls: Vec<CapabilityCall>) -> Self {
        Self {
            content: content.into(),
            capability_calls,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(content, Vec::new())
    }

    pub fn has_capability_calls(&self) -> bool {
        !self.capability_calls.is_empty()
    }

    /// True when the message carries neither text nor capability calls.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.capability_calls.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant(AssistantMessage),
    Tool {
        tool_call_id: String,
        content: String,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant(AssistantMessage::text(content))
    }

    pub fn assistant_calls(capability_calls: Vec<CapabilityCall>) -> Self {
        Self::Assistant(AssistantMessage::new(String::new(), capability_calls))
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::System { .. } => Role::System,
            Self::User { .. } => Role::User,
            Self::Assistant(_) => Role::Assistant,
            Self::Tool { .. } => Role::Tool,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::System { content } | Self::User { content } | Self::Tool { content, .. } => {
                content
            }
            Self::Assistant(message) => &message.content,
        }
    }

    pub fn as_assistant(&self) -> Option<&AssistantMessage> {
        match self {
            Self::Assistant(message) => Some(message),
            _ => None,
        }
    }

    pub fn tool_call_id(&self) -> Option<&str> {
        match self {
            Self::Tool { tool_call_id, .. } => Some(tool_call_id),
            _ => None,
        }
    }
}

/// A capability as advertised to the model.
///
/// `parameters` is a JSON schema document; `Value::Null` means the provider did not send one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Value,
}

impl CapabilityDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Names listed in the schema's `required` array, ignoring non-string entries.
    pub fn required_parameters(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(Value::as_array)
            .map(|required| required.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub capabilities: Vec<CapabilityDescriptor>,
    pub options: GenerationOptions,
    pub parallel_capability_calls: bool,
    pub metadata: MetadataMap,
}

impl CompletionRequest {
    pub fn builder(model: impl Into<String>) -> CompletionRequestBuilder {
        CompletionRequestBuilder::new(model)
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one message is required",
            ));
        }

        if let Some(max_tokens) = self.options.max_tokens
            && max_tokens == 0
        {
            return Err(ProviderError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        if let Some(temperature) = self.options.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ProviderError::invalid_request(
                "temperature must be in the inclusive range 0.0..=2.0",
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequestBuilder {
    model: String,
    messages: Vec<Message>,
    capabilities: Vec<CapabilityDescriptor>,
    options: GenerationOptions,
    parallel_capability_calls: bool,
    metadata: MetadataMap,
}

impl CompletionRequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            capabilities: Vec::new(),
            options: GenerationOptions::default().enable_streaming(),
            parallel_capability_calls: false,
            metadata: MetadataMap::new(),
        }
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn capabilities(mut self, capabilities: Vec<CapabilityDescriptor>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn options(mut self, options: GenerationOptions) -> Self {
        self.options = options.enable_streaming();
        self
    }

    pub fn parallel_capability_calls(mut self, enabled: bool) -> Self {
        self.parallel_capability_calls = enabled;
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<CompletionRequest, ProviderError> {
        let request = CompletionRequest {
            model: self.model,
            messages: self.messages,
            capabilities: self.capabilities,
            options: self.options,
            parallel_capability_calls: self.parallel_capability_calls,
            metadata: self.metadata,
        };

        request.validate()?;
        Ok(request)
    }
}
