//! Metrics-based observability hooks for capability dispatch and conversation turns.
//!
//! ```rust
//! use lobserve::MetricsObservabilityHooks;
//! use ltooling::CapabilityHooks;
//!
//! fn accepts_capability_hooks(_hooks: &dyn CapabilityHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_capability_hooks(&hooks);
//! ```

use std::time::Duration;

use lchat::{ChatError, TurnHooks, TurnResult, TurnState};
use lcommon::SessionId;
use lprovider::CapabilityCall;
use ltooling::{CapabilityError, CapabilityHooks, DispatchContext, SessionFailure};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl CapabilityHooks for MetricsObservabilityHooks {
    fn on_catalog_refreshed(&self, descriptors: usize, failures: &[SessionFailure]) {
        metrics::counter!("lattice_catalog_refresh_total").increment(1);
        metrics::gauge!("lattice_catalog_capabilities").set(descriptors as f64);
        if !failures.is_empty() {
            metrics::counter!("lattice_catalog_refresh_partial_total").increment(1);
        }
    }

    fn on_session_list_failure(&self, session: &str, error: &CapabilityError) {
        metrics::counter!(
            "lattice_catalog_session_failure_total",
            "session" => session.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }

    fn on_session_close_failure(&self, session: &str, error: &CapabilityError) {
        metrics::counter!(
            "lattice_session_close_failure_total",
            "session" => session.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }

    fn on_dispatch_start(&self, call: &CapabilityCall, _context: &DispatchContext) {
        metrics::counter!(
            "lattice_dispatch_start_total",
            "capability" => call.name.clone()
        )
        .increment(1);
    }

    fn on_session_attempt_failure(
        &self,
        call: &CapabilityCall,
        _context: &DispatchContext,
        session: &str,
        error: &CapabilityError,
    ) {
        metrics::counter!(
            "lattice_dispatch_fallback_total",
            "capability" => call.name.clone(),
            "session" => session.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }

    fn on_dispatch_success(
        &self,
        call: &CapabilityCall,
        _context: &DispatchContext,
        session: &str,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "lattice_dispatch_success_total",
            "capability" => call.name.clone(),
            "session" => session.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "lattice_dispatch_duration_seconds",
            "capability" => call.name.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_dispatch_failure(
        &self,
        call: &CapabilityCall,
        _context: &DispatchContext,
        error: &CapabilityError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "lattice_dispatch_failure_total",
            "capability" => call.name.clone(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "lattice_dispatch_duration_seconds",
            "capability" => call.name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl TurnHooks for MetricsObservabilityHooks {
    fn on_turn_start(&self, _session_id: &SessionId, _utterance: &str) {
        metrics::counter!("lattice_turn_start_total").increment(1);
    }

    fn on_state_change(&self, _session_id: &SessionId, _from: TurnState, to: TurnState) {
        metrics::counter!("lattice_turn_state_change_total", "to" => to.to_string()).increment(1);
    }

    fn on_capability_call_skipped(
        &self,
        _session_id: &SessionId,
        call: &CapabilityCall,
        _error: &CapabilityError,
    ) {
        metrics::counter!(
            "lattice_turn_call_skipped_total",
            "capability" => call.name.clone()
        )
        .increment(1);
    }

    fn on_turn_complete(&self, _session_id: &SessionId, result: &TurnResult, elapsed: Duration) {
        metrics::counter!("lattice_turn_complete_total").increment(1);
        metrics::histogram!("lattice_turn_rounds").record(result.rounds as f64);
        metrics::histogram!("lattice_turn_duration_seconds", "status" => "complete")
            .record(elapsed.as_secs_f64());
    }

    fn on_turn_failed(&self, _session_id: &SessionId, error: &ChatError, elapsed: Duration) {
        metrics::counter!(
            "lattice_turn_failed_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!("lattice_turn_duration_seconds", "status" => "failed")
            .record(elapsed.as_secs_f64());
    }
}
