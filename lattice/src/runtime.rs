//! Runtime wiring helpers for conversations with observability attached.

use std::sync::Arc;

use lobserve::{
    MetricsObservabilityHooks, SafeCapabilityHooks, SafeTurnHooks, TracingObservabilityHooks,
};

use crate::{
    CapabilityHooks, CapabilitySession, ChatError, ChatPolicy, CompletionClient, Conversation,
    ConversationBuilder, TurnHooks,
};

/// Which observability hooks a conversation built here reports to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Observability {
    Off,
    #[default]
    Tracing,
    Metrics,
}

impl Observability {
    pub fn turn_hooks(self) -> Option<Arc<dyn TurnHooks>> {
        match self {
            Self::Off => None,
            Self::Tracing => Some(Arc::new(SafeTurnHooks::new(TracingObservabilityHooks))),
            Self::Metrics => Some(Arc::new(SafeTurnHooks::new(MetricsObservabilityHooks))),
        }
    }

    pub fn capability_hooks(self) -> Option<Arc<dyn CapabilityHooks>> {
        match self {
            Self::Off => None,
            Self::Tracing => Some(Arc::new(SafeCapabilityHooks::new(
                TracingObservabilityHooks,
            ))),
            Self::Metrics => Some(Arc::new(SafeCapabilityHooks::new(
                MetricsObservabilityHooks,
            ))),
        }
    }
}

pub fn conversation(client: Arc<dyn CompletionClient>, policy: ChatPolicy) -> ConversationBuilder {
    observed_conversation(client, policy, Observability::default())
}

pub fn observed_conversation(
    client: Arc<dyn CompletionClient>,
    policy: ChatPolicy,
    observability: Observability,
) -> ConversationBuilder {
    let mut builder = Conversation::builder(client, policy);

    if let Some(hooks) = observability.turn_hooks() {
        builder = builder.hooks(hooks);
    }
    if let Some(hooks) = observability.capability_hooks() {
        builder = builder.capability_hooks(hooks);
    }

    builder
}

/// Builds a traced conversation over `sessions` and runs the first catalog refresh.
pub async fn connect(
    client: Arc<dyn CompletionClient>,
    policy: ChatPolicy,
    sessions: impl IntoIterator<Item = Arc<dyn CapabilitySession>>,
) -> Result<Conversation, ChatError> {
    sessions
        .into_iter()
        .fold(conversation(client, policy), ConversationBuilder::session)
        .connect()
        .await
}
