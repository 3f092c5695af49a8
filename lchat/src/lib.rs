//! Conversation orchestration over a streaming model and capability sessions.
//!
//! ```rust
//! use lchat::{ChatPolicy, ConversationState, TurnState};
//!
//! let policy = ChatPolicy::new("gpt-4o-mini").with_max_rounds(8);
//! assert!(policy.validate().is_ok());
//!
//! let transcript = ConversationState::new(policy.system_prompt.clone());
//! assert_eq!(transcript.message_count(), 1);
//! assert!(!TurnState::Idle.is_active());
//! ```

mod conversation;
mod error;
mod hooks;
mod policy;
mod state;
mod types;

pub mod prelude {
    pub use crate::{
        CallStatus, CapabilityCallRecord, ChatError, ChatErrorKind, ChatEvent, ChatEventStream,
        ChatPolicy, Conversation, ConversationBuilder, ConversationState, NoopTurnHooks,
        TurnHooks, TurnResult, TurnState,
    };
    pub use lcommon::{CancellationToken, SessionId};
    pub use ltooling::{
        CapabilityError, CapabilityErrorKind, CapabilityOutput, CapabilitySession, CatalogPolicy,
        DispatchPolicy, DuplicatePolicy, LocalSession, SessionFailure, UserIdentity,
    };
}

pub use conversation::{Conversation, ConversationBuilder, tool_result_text};
pub use error::{ChatError, ChatErrorKind};
pub use hooks::{NoopTurnHooks, TurnHooks};
pub use policy::{ChatPolicy, DEFAULT_MAX_ROUNDS, DEFAULT_SYSTEM_PROMPT};
pub use state::ConversationState;
pub use types::{
    CallStatus, CapabilityCallRecord, ChatEvent, ChatEventStream, TurnResult, TurnState,
};
pub use lcommon::{CancellationToken, SessionId};
