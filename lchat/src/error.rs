//! Turn-level errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

use lprovider::ProviderError;
use ltooling::CapabilityError;

use crate::TurnState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidRequest,
    /// An append would break a transcript invariant.
    InvalidState,
    /// Opening or reading the completion stream failed.
    StreamTransport,
    Cancelled,
    EmptyCompletion,
    RoundLimit,
    Catalog,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
    pub retryable: bool,
    /// Loop state the turn was in when the error surfaced.
    pub phase: Option<TurnState>,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable: false,
            phase: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidState, message)
    }

    pub fn stream_transport(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::StreamTransport, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Cancelled, message)
    }

    pub fn empty_completion(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::EmptyCompletion, message)
    }

    pub fn round_limit(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::RoundLimit, message)
    }

    pub fn catalog(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Catalog, message)
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn with_phase(mut self, phase: TurnState) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.phase {
            Some(phase) => write!(f, "{:?} [phase={}]: {}", self.kind, phase, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ChatError {}

impl From<ProviderError> for ChatError {
    fn from(value: ProviderError) -> Self {
        let retryable = value.retryable;
        ChatError::stream_transport(value.to_string()).with_retryable(retryable)
    }
}

impl From<CapabilityError> for ChatError {
    fn from(value: CapabilityError) -> Self {
        let retryable = value.retryable;
        ChatError::catalog(value.to_string()).with_retryable(retryable)
    }
}
