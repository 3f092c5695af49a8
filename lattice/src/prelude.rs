//! Common imports for most lattice applications.

pub use crate::{
    assistant_message, capability_call, connect, conversation, observed_conversation, policy,
    string_capability, system_message, text_output, tool_message, user_message,
};
pub use crate::{lt_messages, lt_msg, lt_policy};
pub use crate::{
    CancellationToken, CapabilityCall, CapabilityDescriptor, CapabilityError, CapabilityHooks,
    CapabilityOutput, CapabilitySession, CatalogPolicy, ChatError, ChatErrorKind, ChatEvent,
    ChatEventStream, ChatPolicy, CompletionClient, CompletionRequest, Conversation,
    ConversationBuilder, ConversationState, DispatchPolicy, DuplicatePolicy, Fragment,
    LocalSession, Message, Observability, ProviderError, Role, SessionId, TurnHooks, TurnResult,
    TurnState, UserIdentity, required_string,
};
