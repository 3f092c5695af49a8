//! Unified facade over the lattice workspace crates.
//!
//! This crate is meant to be the single dependency for most applications. It re-exports the
//! lattice crates and adds convenience constructors, macros, and wiring helpers that attach
//! observability to a [`Conversation`].
//!
//! ```rust
//! use lattice::prelude::*;
//!
//! let mut files = LocalSession::new("files");
//! files.register_sync_fn(
//!     string_capability("read_file", "Reads a file", &["path"]),
//!     |_| text_output("hello"),
//! );
//!
//! let policy = lt_policy!("gpt-4o-mini", "Answer briefly.", rounds = 8);
//! assert!(policy.validate().is_ok());
//! assert!(files.provides("read_file"));
//! ```

mod macros;

pub mod prelude;
pub mod runtime;
pub mod util;

pub use lchat;
pub use lcommon;
pub use lobserve;
pub use lprovider;
pub use ltooling;

pub use lchat::{
    CallStatus, CapabilityCallRecord, ChatError, ChatErrorKind, ChatEvent, ChatEventStream,
    ChatPolicy, Conversation, ConversationBuilder, ConversationState, DEFAULT_MAX_ROUNDS,
    DEFAULT_SYSTEM_PROMPT, NoopTurnHooks, TurnHooks, TurnResult, TurnState, tool_result_text,
};
pub use lcommon::{
    BoxFuture, CancellationToken, GenerationOptions, MetadataMap, SessionId, TraceId,
};
pub use lobserve::{
    MetricsObservabilityHooks, SafeCapabilityHooks, SafeTurnHooks, TracingObservabilityHooks,
};
pub use lprovider::{
    AssistantMessage, BoxedFragmentStream, CapabilityCall, CapabilityCallFragment,
    CapabilityDescriptor, CompletionClient, CompletionRequest, CompletionRequestBuilder, Fragment,
    FragmentStream, Message, ProviderError, ProviderErrorKind, ProviderFuture, Role,
    StreamAccumulator, VecFragmentStream,
};
pub use ltooling::{
    CapabilityCatalog, CapabilityContent, CapabilityDispatcher, CapabilityError,
    CapabilityErrorKind, CapabilityHooks, CapabilityOutput, CapabilitySession, CatalogPolicy,
    DispatchContext, DispatchOutcome, DispatchPolicy, DuplicatePolicy, LocalSession,
    NoopCapabilityHooks, SessionFailure, SessionRegistry, UserIdentity, parse_arguments,
    required_string,
};

pub use runtime::{Observability, connect, conversation, observed_conversation};
pub use util::{
    assistant_message, capability_call, policy, string_capability, system_message, text_output,
    tool_message, user_message,
};
