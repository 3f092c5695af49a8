//! Append-only conversation transcript.
//!
//! ```rust
//! use lchat::ConversationState;
//! use lprovider::{AssistantMessage, CapabilityCall};
//!
//! let mut state = ConversationState::new("You are helpful.");
//! state.push_user("read x.txt").expect("user message");
//! state
//!     .push_assistant(AssistantMessage::new(
//!         "",
//!         vec![CapabilityCall::new("call_1", "read_file", r#"{"path":"x.txt"}"#)],
//!     ))
//!     .expect("assistant message");
//! assert_eq!(state.unresolved_call_ids(), ["call_1"]);
//!
//! state.push_tool_result("call_1", "hello").expect("tool message");
//! assert!(state.unresolved_call_ids().is_empty());
//! assert!(state.push_tool_result("call_1", "again").is_err());
//! ```

use std::collections::HashSet;

use lprovider::{AssistantMessage, Message};

use crate::ChatError;

/// Ordered transcript whose first message is always the single system message.
///
/// Every append checks the transcript invariants, so a `ConversationState` can only hold
/// sequences the orchestration loop could have produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    messages: Vec<Message>,
    /// Requested call ids without a tool message yet, in request order.
    unresolved: Vec<String>,
}

impl ConversationState {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
            unresolved: Vec::new(),
        }
    }

    /// Rebuilds a transcript, validating every message as if it were appended in order.
    pub fn from_messages(messages: impl IntoIterator<Item = Message>) -> Result<Self, ChatError> {
        let mut messages = messages.into_iter();
        let mut state = match messages.next() {
            Some(Message::System { content }) => Self::new(content),
            Some(other) => {
                return Err(ChatError::invalid_state(format!(
                    "transcript must start with a system message, found {}",
                    other.role()
                )));
            }
            None => return Err(ChatError::invalid_state("transcript is empty")),
        };

        for message in messages {
            state.push(message)?;
        }

        Ok(state)
    }

    pub fn push(&mut self, message: Message) -> Result<(), ChatError> {
        match message {
            Message::System { .. } => Err(ChatError::invalid_state(
                "only the first message may be a system message",
            )),
            Message::User { content } => self.push_user(content),
            Message::Assistant(assistant) => self.push_assistant(assistant),
            Message::Tool {
                tool_call_id,
                content,
            } => self.push_tool_result(&tool_call_id, content),
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> Result<(), ChatError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ChatError::invalid_request("user message must not be empty"));
        }

        self.messages.push(Message::user(content));
        Ok(())
    }

    pub fn push_assistant(&mut self, message: AssistantMessage) -> Result<(), ChatError> {
        if message.is_empty() {
            return Err(ChatError::invalid_state(
                "assistant message must carry content or capability calls",
            ));
        }

        let mut seen = HashSet::new();
        for call in &message.capability_calls {
            if call.id.is_empty() || call.name.is_empty() {
                return Err(ChatError::invalid_state(
                    "capability calls need both an id and a name",
                ));
            }

            if !seen.insert(call.id.as_str()) {
                return Err(ChatError::invalid_state(format!(
                    "capability call id '{}' appears twice in one assistant message",
                    call.id
                )));
            }
        }

        self.unresolved.extend(
            message
                .capability_calls
                .iter()
                .map(|call| call.id.clone()),
        );
        self.messages.push(Message::Assistant(message));
        Ok(())
    }

    /// Appends the result for an earlier, still unresolved capability call.
    ///
    /// When an id is pending more than once, the most recently requested call is resolved.
    pub fn push_tool_result(
        &mut self,
        call_id: &str,
        content: impl Into<String>,
    ) -> Result<(), ChatError> {
        let Some(position) = self.unresolved.iter().rposition(|id| id == call_id) else {
            return Err(ChatError::invalid_state(format!(
                "no unresolved capability call with id '{call_id}'"
            )));
        };

        self.unresolved.remove(position);
        self.messages.push(Message::tool(call_id, content));
        Ok(())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn system_prompt(&self) -> &str {
        self.messages
            .first()
            .map(Message::content)
            .unwrap_or_default()
    }

    pub fn unresolved_call_ids(&self) -> &[String] {
        &self.unresolved
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages, the system message included.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Drops everything but the system message.
    pub fn reset(&mut self) {
        self.messages.truncate(1);
        self.unresolved.clear();
    }

    pub fn to_json(&self) -> Result<String, ChatError> {
        serde_json::to_string(&self.messages)
            .map_err(|err| ChatError::invalid_state(format!("failed to encode transcript: {err}")))
    }

    pub fn from_json(json: &str) -> Result<Self, ChatError> {
        let messages: Vec<Message> = serde_json::from_str(json).map_err(|err| {
            ChatError::invalid_request(format!("failed to decode transcript: {err}"))
        })?;

        Self::from_messages(messages)
    }
}
