//! Capability session contract and the ordered session registry.

use std::sync::Arc;

use lcommon::BoxFuture;
use lprovider::CapabilityDescriptor;
use serde_json::{Map, Value};

use crate::{CapabilityError, CapabilityHooks, SessionFailure};

pub type CapabilityFuture<'a, T> = BoxFuture<'a, T>;

/// Text returned when a session reports success without any content.
pub const EMPTY_OUTPUT_TEXT: &str = "Tool executed successfully";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityContent {
    Text(String),
    Json(Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapabilityOutput {
    pub content: Vec<CapabilityContent>,
}

impl CapabilityOutput {
    pub fn new(content: Vec<CapabilityContent>) -> Self {
        Self { content }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![CapabilityContent::Text(text.into())])
    }

    pub fn json(value: Value) -> Self {
        Self::new(vec![CapabilityContent::Json(value)])
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Single textual form inserted into the transcript. Only the first content item is used.
    pub fn to_text(&self) -> String {
        match self.content.first() {
            Some(CapabilityContent::Text(text)) => text.clone(),
            Some(CapabilityContent::Json(value)) => value.to_string(),
            None => EMPTY_OUTPUT_TEXT.to_string(),
        }
    }
}

/// One connection to a capability provider.
///
/// Implementations that can be shared across conversations must serialize access themselves;
/// the dispatcher only guarantees one in-flight call per dispatch.
pub trait CapabilitySession: Send + Sync {
    fn name(&self) -> &str;

    fn list_capabilities<'a>(
        &'a self,
    ) -> CapabilityFuture<'a, Result<Vec<CapabilityDescriptor>, CapabilityError>>;

    fn invoke<'a>(
        &'a self,
        name: &'a str,
        arguments: Map<String, Value>,
    ) -> CapabilityFuture<'a, Result<CapabilityOutput, CapabilityError>>;

    /// Releases the connection. Sessions with nothing to release keep the default.
    fn close<'a>(&'a self) -> CapabilityFuture<'a, Result<(), CapabilityError>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Vec<Arc<dyn CapabilitySession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a session. Names must be unique; registration order is dispatch order.
    pub fn register(&mut self, session: Arc<dyn CapabilitySession>) -> Result<(), CapabilityError> {
        if self.contains(session.name()) {
            return Err(CapabilityError::registration(format!(
                "session '{}' is already registered",
                session.name()
            ))
            .with_session(session.name()));
        }

        self.sessions.push(session);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Arc<dyn CapabilitySession>> {
        self.sessions.get(index)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sessions.iter().any(|session| session.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.sessions.iter().map(|session| session.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn CapabilitySession>> {
        self.sessions.iter()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Closes every session in registration order. A failing session does not stop the rest.
    pub async fn close_all(&self, hooks: &dyn CapabilityHooks) -> Vec<SessionFailure> {
        let mut failures = Vec::new();

        for session in &self.sessions {
            if let Err(error) = session.close().await {
                let error = error.with_session(session.name());
                tracing::warn!(
                    phase = "session",
                    event = "close_failure",
                    session = session.name(),
                    error_kind = ?error.kind,
                    error = %error
                );
                hooks.on_session_close_failure(session.name(), &error);
                failures.push(SessionFailure {
                    session: session.name().to_string(),
                    error,
                });
            }
        }

        failures
    }
}
