//! Capability errors and classifications.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityErrorKind {
    /// No session accepted the capability name.
    NotFound,
    /// Arguments were not a JSON object or missed a required parameter.
    InvalidArguments,
    /// A session accepted the call and reported a failure.
    Execution,
    /// A session exceeded the per-call deadline.
    Timeout,
    /// The session could not be reached, e.g. while listing capabilities.
    Unavailable,
    DuplicateCapability,
    Registration,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityError {
    pub kind: CapabilityErrorKind,
    pub message: String,
    pub retryable: bool,
    pub capability: Option<String>,
    pub session: Option<String>,
}

impl CapabilityError {
    pub fn new(kind: CapabilityErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            capability: None,
            session: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(CapabilityErrorKind::NotFound, message, false)
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(CapabilityErrorKind::InvalidArguments, message, false)
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(CapabilityErrorKind::Execution, message, false)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(CapabilityErrorKind::Timeout, message, true)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(CapabilityErrorKind::Unavailable, message, true)
    }

    pub fn duplicate_capability(message: impl Into<String>) -> Self {
        Self::new(CapabilityErrorKind::DuplicateCapability, message, false)
    }

    pub fn registration(message: impl Into<String>) -> Self {
        Self::new(CapabilityErrorKind::Registration, message, false)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(CapabilityErrorKind::Other, message, false)
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = Some(capability.into());
        self
    }

    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// Errors the model can fix by changing its request.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind,
            CapabilityErrorKind::InvalidArguments | CapabilityErrorKind::NotFound
        )
    }

    /// The session took the call and then failed, as opposed to declining it.
    pub fn is_accepted_failure(&self) -> bool {
        matches!(
            self.kind,
            CapabilityErrorKind::Execution
                | CapabilityErrorKind::Timeout
                | CapabilityErrorKind::InvalidArguments
        )
    }
}

impl Display for CapabilityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.capability, &self.session) {
            (Some(capability), Some(session)) => write!(
                f,
                "{:?} [capability={}, session={}]: {}",
                self.kind, capability, session, self.message
            ),
            (Some(capability), None) => {
                write!(f, "{:?} [capability={}]: {}", self.kind, capability, self.message)
            }
            (None, Some(session)) => {
                write!(f, "{:?} [session={}]: {}", self.kind, session, self.message)
            }
            (None, None) => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for CapabilityError {}
