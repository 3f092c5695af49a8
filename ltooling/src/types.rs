//! Dispatch context and outcome types.

use lcommon::{MetadataMap, SessionId, TraceId};
use lprovider::CapabilityCall;

use crate::CapabilityOutput;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchContext {
    pub session_id: SessionId,
    pub trace_id: Option<TraceId>,
    pub metadata: MetadataMap,
}

impl DispatchContext {
    pub fn new(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: session_id.into(),
            trace_id: None,
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Result of a successful dispatch: which session answered, and with what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub call_id: String,
    pub session: String,
    pub output: CapabilityOutput,
}

impl DispatchOutcome {
    pub fn new(call: &CapabilityCall, session: impl Into<String>, output: CapabilityOutput) -> Self {
        Self {
            call_id: call.id.clone(),
            session: session.into(),
            output,
        }
    }

    pub fn to_text(&self) -> String {
        self.output.to_text()
    }
}
