//! The orchestration loop: one conversation, one turn at a time.
//!
//! A turn appends the user utterance, then alternates between streaming a completion and
//! executing the capability calls it requested, until the model answers without calls.
//! Calls run strictly one after another in the order the model listed them.

use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use async_stream::stream;
use futures_util::StreamExt;
use futures_util::future::{Either, select};
use lcommon::{CancellationToken, SessionId, TraceId};
use lprovider::{CompletionClient, CompletionRequest, Fragment, StreamAccumulator};
use ltooling::{
    CapabilityCatalog, CapabilityDispatcher, CapabilityError, CapabilityHooks, CapabilitySession,
    CatalogPolicy, DEFAULT_IDENTITY_PARAMETER, DispatchContext, DispatchOutcome, DispatchPolicy,
    NoopCapabilityHooks, SessionFailure, SessionRegistry, parse_arguments,
};

use crate::{
    CapabilityCallRecord, ChatError, ChatEvent, ChatEventStream, ChatPolicy, ConversationState,
    NoopTurnHooks, TurnHooks, TurnResult, TurnState,
};

static NEXT_CONVERSATION_ID: AtomicU64 = AtomicU64::new(1);

fn next_conversation_id() -> SessionId {
    let id = NEXT_CONVERSATION_ID.fetch_add(1, Ordering::Relaxed);
    SessionId::new(format!("conversation-{id}"))
}

/// Text appended as the tool message for a dispatched call.
pub fn tool_result_text(result: &Result<DispatchOutcome, CapabilityError>) -> String {
    match result {
        Ok(outcome) => outcome.to_text(),
        Err(error) => format!("Error: {error}"),
    }
}

fn cancelled() -> ChatError {
    ChatError::cancelled("turn cancelled by caller")
}

/// Resolves to `None` if `cancel` fires before `future` completes.
async fn until_cancelled<F: Future>(cancel: &CancellationToken, future: F) -> Option<F::Output> {
    let future = pin!(future);
    let cancellation = pin!(cancel.cancelled());

    match select(future, cancellation).await {
        Either::Left((output, _)) => Some(output),
        Either::Right(((), _)) => None,
    }
}

pub struct Conversation {
    id: SessionId,
    client: Arc<dyn CompletionClient>,
    sessions: SessionRegistry,
    catalog: CapabilityCatalog,
    catalog_policy: CatalogPolicy,
    dispatcher: CapabilityDispatcher,
    capability_hooks: Arc<dyn CapabilityHooks>,
    hooks: Arc<dyn TurnHooks>,
    policy: ChatPolicy,
    transcript: ConversationState,
    turn_state: TurnState,
    turns: u64,
}

impl Conversation {
    pub fn builder(client: Arc<dyn CompletionClient>, policy: ChatPolicy) -> ConversationBuilder {
        ConversationBuilder::new(client, policy)
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn state(&self) -> TurnState {
        self.turn_state
    }

    pub fn transcript(&self) -> &ConversationState {
        &self.transcript
    }

    pub fn catalog(&self) -> &CapabilityCatalog {
        &self.catalog
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn policy(&self) -> &ChatPolicy {
        &self.policy
    }

    /// Registers another session. Its capabilities reach the model after the next refresh.
    pub fn add_session(&mut self, session: Arc<dyn CapabilitySession>) -> Result<(), ChatError> {
        self.sessions
            .register(session)
            .map_err(|error| ChatError::invalid_request(error.to_string()))
    }

    /// Rebuilds the catalog from every session. On error the previous catalog stays in place.
    pub async fn refresh_capabilities(&mut self) -> Result<&CapabilityCatalog, ChatError> {
        let catalog = CapabilityCatalog::refresh(
            &self.sessions,
            &self.catalog_policy,
            self.capability_hooks.as_ref(),
        )
        .await?;

        self.catalog = catalog;
        Ok(&self.catalog)
    }

    /// Closes every registered session in registration order and clears the catalog.
    ///
    /// A session that fails to close is logged and reported through the capability hooks;
    /// the remaining sessions are still closed.
    pub async fn close(&mut self) -> Vec<SessionFailure> {
        let failures = self
            .sessions
            .close_all(self.capability_hooks.as_ref())
            .await;
        self.catalog = CapabilityCatalog::empty();
        failures
    }

    /// Starts over from the system prompt.
    pub fn reset(&mut self) {
        self.transcript.reset();
        self.transition(TurnState::Idle);
    }

    /// Drives one turn and drains its events, returning the terminal outcome.
    pub async fn run_turn(
        &mut self,
        utterance: impl Into<String>,
        cancel: CancellationToken,
    ) -> Result<TurnResult, ChatError> {
        let mut events = self.stream_turn(utterance, cancel);
        while let Some(event) = events.next().await {
            match event {
                ChatEvent::TurnComplete(result) => return Ok(result),
                ChatEvent::TurnFailed { reason } => return Err(reason),
                _ => {}
            }
        }

        Err(ChatError::invalid_state("turn ended without a terminal event"))
    }

    /// Submits a user utterance and streams rendering events for the resulting turn.
    ///
    /// The stream always ends with exactly one `TurnComplete` or `TurnFailed`. Dropping it
    /// early abandons the turn; whatever was appended so far stays in the transcript.
    pub fn stream_turn<'a>(
        &'a mut self,
        utterance: impl Into<String>,
        cancel: CancellationToken,
    ) -> ChatEventStream<'a> {
        let utterance = utterance.into();

        Box::pin(stream! {
            let started_at = Instant::now();
            self.turns += 1;
            let trace_id = TraceId::for_turn(&self.id, self.turns);
            self.hooks.on_turn_start(&self.id, &utterance);

            let outcome: Result<TurnResult, ChatError> = 'turn: {
                if utterance.trim().is_empty() {
                    break 'turn Err(ChatError::invalid_request("utterance must not be empty"));
                }

                if self.turn_state.is_active() {
                    tracing::warn!(
                        phase = "turn",
                        event = "abandoned_turn",
                        session_id = %self.id,
                        state = %self.turn_state
                    );
                }

                self.transition(TurnState::Idle);
                if let Err(error) = self.transcript.push_user(utterance.clone()) {
                    break 'turn Err(error);
                }
                self.transition(TurnState::AwaitingCompletion);

                let mut rounds = 0_u32;
                let mut records = Vec::new();

                loop {
                    if cancel.is_cancelled() {
                        break 'turn Err(cancelled());
                    }

                    if let Some(limit) = self.policy.max_rounds
                        && rounds >= limit
                    {
                        break 'turn Err(ChatError::round_limit(format!(
                            "turn stopped after {limit} completion rounds"
                        )));
                    }

                    rounds += 1;
                    self.hooks.on_round_start(&self.id, rounds);

                    let request = match self.completion_request(&trace_id) {
                        Ok(request) => request,
                        Err(error) => break 'turn Err(error),
                    };

                    let client = Arc::clone(&self.client);
                    let mut fragments = match until_cancelled(&cancel, client.stream(request)).await {
                        Some(Ok(fragments)) => fragments,
                        Some(Err(error)) => break 'turn Err(ChatError::from(error)),
                        None => break 'turn Err(cancelled()),
                    };

                    let mut accumulator = StreamAccumulator::new();
                    loop {
                        match until_cancelled(&cancel, fragments.next()).await {
                            Some(Some(Ok(fragment))) => {
                                accumulator.push(&fragment);
                                if let Fragment::TextDelta(delta) = fragment
                                    && !delta.is_empty()
                                {
                                    yield ChatEvent::AssistantTextDelta(delta);
                                }
                            }
                            Some(Some(Err(error))) => break 'turn Err(ChatError::from(error)),
                            Some(None) => break,
                            None => break 'turn Err(cancelled()),
                        }
                    }
                    drop(fragments);

                    let message = accumulator.finish();
                    if message.is_empty() {
                        break 'turn Err(ChatError::empty_completion(
                            "model returned neither text nor capability calls",
                        ));
                    }

                    let content = message.content.clone();
                    let calls = message.capability_calls.clone();
                    if let Err(error) = self.transcript.push_assistant(message) {
                        break 'turn Err(error);
                    }

                    if calls.is_empty() {
                        break 'turn Ok(TurnResult {
                            session_id: self.id.clone(),
                            assistant_message: content,
                            rounds,
                            capability_calls: records,
                        });
                    }

                    self.transition(TurnState::ExecutingCapabilities);

                    for call in calls {
                        if cancel.is_cancelled() {
                            break 'turn Err(cancelled());
                        }

                        let arguments = match parse_arguments(&call.arguments) {
                            Ok(arguments) => arguments,
                            Err(error) => {
                                let error = error.with_capability(call.name.clone());
                                tracing::warn!(
                                    phase = "turn",
                                    event = "capability_call_skipped",
                                    session_id = %self.id,
                                    call_id = %call.id,
                                    capability = %call.name,
                                    error = %error
                                );
                                self.hooks.on_capability_call_skipped(&self.id, &call, &error);
                                yield ChatEvent::CapabilityCallSkipped {
                                    call_id: call.id.clone(),
                                    name: call.name.clone(),
                                    reason: error.to_string(),
                                };
                                records.push(CapabilityCallRecord::skipped(call, error));
                                continue;
                            }
                        };

                        yield ChatEvent::CapabilityCallStarted {
                            call_id: call.id.clone(),
                            name: call.name.clone(),
                            arguments: call.arguments.clone(),
                        };

                        let context = DispatchContext::new(self.id.clone())
                            .with_trace_id(trace_id.clone())
                            .with_metadata("round", rounds.to_string());
                        let dispatched = until_cancelled(
                            &cancel,
                            self.dispatcher.dispatch(
                                &self.sessions,
                                &self.catalog,
                                &call,
                                arguments,
                                &context,
                            ),
                        )
                        .await;
                        let Some(result) = dispatched else {
                            break 'turn Err(cancelled());
                        };

                        let text = tool_result_text(&result);
                        if let Err(error) = self.transcript.push_tool_result(&call.id, text.clone()) {
                            break 'turn Err(error);
                        }

                        let outcome = match &result {
                            Ok(_) => Ok(text),
                            Err(_) => Err(text),
                        };
                        yield ChatEvent::CapabilityCallFinished {
                            call_id: call.id.clone(),
                            name: call.name.clone(),
                            outcome,
                        };
                        records.push(CapabilityCallRecord::dispatched(call, &result));
                    }

                    self.transition(TurnState::AwaitingCompletion);
                }
            };

            let elapsed = started_at.elapsed();
            match outcome {
                Ok(result) => {
                    self.transition(TurnState::Done);
                    self.hooks.on_turn_complete(&self.id, &result, elapsed);
                    yield ChatEvent::TurnComplete(result);
                }
                Err(mut error) => {
                    if self.turn_state.is_active() {
                        if error.phase.is_none() {
                            error.phase = Some(self.turn_state);
                        }
                        self.transition(TurnState::Failed);
                    }
                    self.hooks.on_turn_failed(&self.id, &error, elapsed);
                    yield ChatEvent::TurnFailed { reason: error };
                }
            }
        })
    }

    fn completion_request(&self, trace_id: &TraceId) -> Result<CompletionRequest, ChatError> {
        CompletionRequest::builder(self.policy.model.clone())
            .messages(self.transcript.messages().iter().cloned())
            .capabilities(self.catalog.descriptors().to_vec())
            .options(self.policy.options)
            .parallel_capability_calls(false)
            .metadata("session_id", self.id.as_str())
            .metadata("trace_id", trace_id.as_str())
            .build()
            .map_err(|error| ChatError::invalid_request(error.to_string()))
    }

    fn transition(&mut self, to: TurnState) {
        let from = std::mem::replace(&mut self.turn_state, to);
        if from != to {
            self.hooks.on_state_change(&self.id, from, to);
        }
    }
}

pub struct ConversationBuilder {
    client: Arc<dyn CompletionClient>,
    policy: ChatPolicy,
    id: Option<SessionId>,
    sessions: Vec<Arc<dyn CapabilitySession>>,
    catalog_policy: CatalogPolicy,
    dispatch_policy: DispatchPolicy,
    hooks: Arc<dyn TurnHooks>,
    capability_hooks: Arc<dyn CapabilityHooks>,
    transcript: Option<ConversationState>,
}

impl ConversationBuilder {
    pub fn new(client: Arc<dyn CompletionClient>, policy: ChatPolicy) -> Self {
        Self {
            client,
            policy,
            id: None,
            sessions: Vec::new(),
            catalog_policy: CatalogPolicy::default(),
            dispatch_policy: DispatchPolicy::default(),
            hooks: Arc::new(NoopTurnHooks),
            capability_hooks: Arc::new(NoopCapabilityHooks),
            transcript: None,
        }
    }

    pub fn id(mut self, id: impl Into<SessionId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn session(mut self, session: Arc<dyn CapabilitySession>) -> Self {
        self.sessions.push(session);
        self
    }

    pub fn catalog_policy(mut self, catalog_policy: CatalogPolicy) -> Self {
        self.catalog_policy = catalog_policy;
        self
    }

    pub fn dispatch_policy(mut self, dispatch_policy: DispatchPolicy) -> Self {
        self.dispatch_policy = dispatch_policy;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn TurnHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn capability_hooks(mut self, capability_hooks: Arc<dyn CapabilityHooks>) -> Self {
        self.capability_hooks = capability_hooks;
        self
    }

    /// Resumes from an earlier transcript instead of a fresh one.
    pub fn transcript(mut self, transcript: ConversationState) -> Self {
        self.transcript = Some(transcript);
        self
    }

    /// Builds with an empty catalog. Call [`Conversation::refresh_capabilities`] before the
    /// first turn, or use [`ConversationBuilder::connect`].
    ///
    /// The catalog hides the dispatcher's identity parameter. A catalog policy that reserves a
    /// different, non-default name is rejected.
    pub fn build(mut self) -> Result<Conversation, ChatError> {
        self.policy.validate()?;
        self.dispatch_policy
            .validate()
            .map_err(|error| ChatError::invalid_request(error.to_string()))?;

        let identity_parameter = &self.dispatch_policy.identity.parameter;
        if self.catalog_policy.reserved_parameter != *identity_parameter {
            if self.catalog_policy.reserved_parameter != DEFAULT_IDENTITY_PARAMETER {
                return Err(ChatError::invalid_request(format!(
                    "catalog reserves '{}' but the identity parameter is '{}'",
                    self.catalog_policy.reserved_parameter, identity_parameter
                )));
            }
            self.catalog_policy.reserved_parameter = identity_parameter.clone();
        }
        self.catalog_policy
            .validate()
            .map_err(|error| ChatError::invalid_request(error.to_string()))?;

        let mut sessions = SessionRegistry::new();
        for session in self.sessions {
            sessions
                .register(session)
                .map_err(|error| ChatError::invalid_request(error.to_string()))?;
        }

        let transcript = self
            .transcript
            .unwrap_or_else(|| ConversationState::new(self.policy.system_prompt.clone()));
        let dispatcher = CapabilityDispatcher::new(self.dispatch_policy)
            .with_hooks(Arc::clone(&self.capability_hooks));

        Ok(Conversation {
            id: self.id.unwrap_or_else(next_conversation_id),
            client: self.client,
            sessions,
            catalog: CapabilityCatalog::empty(),
            catalog_policy: self.catalog_policy,
            dispatcher,
            capability_hooks: self.capability_hooks,
            hooks: self.hooks,
            policy: self.policy,
            transcript,
            turn_state: TurnState::Idle,
            turns: 0,
        })
    }

    /// Builds and performs the first catalog refresh.
    pub async fn connect(self) -> Result<Conversation, ChatError> {
        let mut conversation = self.build()?;
        conversation.refresh_capabilities().await?;
        Ok(conversation)
    }
}
