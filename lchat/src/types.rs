//! Turn state, rendering events and turn results.

use std::fmt::{Display, Formatter};
use std::pin::Pin;

use futures_core::Stream;
use lcommon::SessionId;
use lprovider::CapabilityCall;
use ltooling::{CapabilityError, DispatchOutcome};

use crate::ChatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TurnState {
    #[default]
    Idle,
    AwaitingCompletion,
    ExecutingCapabilities,
    Done,
    Failed,
}

impl TurnState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// True while a turn is between its user message and its terminal state.
    pub fn is_active(self) -> bool {
        matches!(self, Self::AwaitingCompletion | Self::ExecutingCapabilities)
    }
}

impl Display for TurnState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = match self {
            Self::Idle => "idle",
            Self::AwaitingCompletion => "awaiting_completion",
            Self::ExecutingCapabilities => "executing_capabilities",
            Self::Done => "done",
            Self::Failed => "failed",
        };

        f.write_str(state)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStatus {
    Completed { session: String, output: String },
    /// Dispatch failed; the error text was still reported to the model.
    Failed(CapabilityError),
    /// Arguments did not parse; nothing was dispatched or appended.
    Skipped(CapabilityError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityCallRecord {
    pub call: CapabilityCall,
    pub status: CallStatus,
}

impl CapabilityCallRecord {
    pub fn dispatched(call: CapabilityCall, result: &Result<DispatchOutcome, CapabilityError>) -> Self {
        let status = match result {
            Ok(outcome) => CallStatus::Completed {
                session: outcome.session.clone(),
                output: outcome.to_text(),
            },
            Err(error) => CallStatus::Failed(error.clone()),
        };

        Self { call, status }
    }

    pub fn skipped(call: CapabilityCall, error: CapabilityError) -> Self {
        Self {
            call,
            status: CallStatus::Skipped(error),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, CallStatus::Completed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResult {
    pub session_id: SessionId,
    pub assistant_message: String,
    /// Completion rounds used, including the final one.
    pub rounds: u32,
    pub capability_calls: Vec<CapabilityCallRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    AssistantTextDelta(String),
    CapabilityCallStarted {
        call_id: String,
        name: String,
        arguments: String,
    },
    /// `outcome` holds the exact text appended as the tool message.
    CapabilityCallFinished {
        call_id: String,
        name: String,
        outcome: Result<String, String>,
    },
    CapabilityCallSkipped {
        call_id: String,
        name: String,
        reason: String,
    },
    TurnComplete(TurnResult),
    TurnFailed {
        reason: ChatError,
    },
}

impl ChatEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::TurnComplete(_) | Self::TurnFailed { .. })
    }
}

pub type ChatEventStream<'a> = Pin<Box<dyn Stream<Item = ChatEvent> + Send + 'a>>;
