//! Tracing-based observability hooks for capability dispatch and conversation turns.
//!
//! ```rust
//! use lobserve::TracingObservabilityHooks;
//! use lchat::TurnHooks;
//!
//! fn accepts_turn_hooks(_hooks: &dyn TurnHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_turn_hooks(&hooks);
//! ```

use std::time::Duration;

use lchat::{ChatError, TurnHooks, TurnResult, TurnState};
use lcommon::SessionId;
use lprovider::CapabilityCall;
use ltooling::{CapabilityError, CapabilityHooks, DispatchContext, SessionFailure};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl CapabilityHooks for TracingObservabilityHooks {
    fn on_catalog_refreshed(&self, descriptors: usize, failures: &[SessionFailure]) {
        if failures.is_empty() {
            tracing::info!(phase = "catalog", event = "refreshed", descriptors);
        } else {
            tracing::warn!(
                phase = "catalog",
                event = "refreshed_partial",
                descriptors,
                failed_sessions = failures.len()
            );
        }
    }

    fn on_session_list_failure(&self, session: &str, error: &CapabilityError) {
        tracing::warn!(
            phase = "catalog",
            event = "session_list_failure",
            session,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_session_close_failure(&self, session: &str, error: &CapabilityError) {
        tracing::warn!(
            phase = "session",
            event = "close_failure",
            session,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_dispatch_start(&self, call: &CapabilityCall, context: &DispatchContext) {
        tracing::info!(
            phase = "dispatch",
            event = "start",
            capability = call.name,
            call_id = call.id,
            session_id = %context.session_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str())
        );
    }

    fn on_session_attempt_failure(
        &self,
        call: &CapabilityCall,
        context: &DispatchContext,
        session: &str,
        error: &CapabilityError,
    ) {
        tracing::debug!(
            phase = "dispatch",
            event = "session_attempt_failure",
            capability = call.name,
            call_id = call.id,
            session_id = %context.session_id,
            session,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_dispatch_success(
        &self,
        call: &CapabilityCall,
        context: &DispatchContext,
        session: &str,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "dispatch",
            event = "success",
            capability = call.name,
            call_id = call.id,
            session_id = %context.session_id,
            session,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_dispatch_failure(
        &self,
        call: &CapabilityCall,
        context: &DispatchContext,
        error: &CapabilityError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "dispatch",
            event = "failure",
            capability = call.name,
            call_id = call.id,
            session_id = %context.session_id,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}

impl TurnHooks for TracingObservabilityHooks {
    fn on_turn_start(&self, session_id: &SessionId, utterance: &str) {
        tracing::info!(
            phase = "turn",
            event = "start",
            session_id = %session_id,
            utterance_chars = utterance.chars().count()
        );
    }

    fn on_state_change(&self, session_id: &SessionId, from: TurnState, to: TurnState) {
        tracing::debug!(
            phase = "turn",
            event = "state_change",
            session_id = %session_id,
            from = %from,
            to = %to
        );
    }

    fn on_round_start(&self, session_id: &SessionId, round: u32) {
        tracing::debug!(phase = "turn", event = "round_start", session_id = %session_id, round);
    }

    fn on_capability_call_skipped(
        &self,
        session_id: &SessionId,
        call: &CapabilityCall,
        error: &CapabilityError,
    ) {
        tracing::warn!(
            phase = "turn",
            event = "call_skipped",
            session_id = %session_id,
            capability = call.name,
            call_id = call.id,
            error = %error
        );
    }

    fn on_turn_complete(&self, session_id: &SessionId, result: &TurnResult, elapsed: Duration) {
        tracing::info!(
            phase = "turn",
            event = "complete",
            session_id = %session_id,
            rounds = result.rounds,
            capability_calls = result.capability_calls.len(),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_turn_failed(&self, session_id: &SessionId, error: &ChatError, elapsed: Duration) {
        tracing::error!(
            phase = "turn",
            event = "failed",
            session_id = %session_id,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}
