use std::sync::{Arc, Mutex};
use std::time::Duration;

use lchat::{ChatError, TurnHooks, TurnResult, TurnState};
use lcommon::SessionId;
use lprovider::CapabilityCall;
use ltooling::{CapabilityError, CapabilityHooks, DispatchContext, SessionFailure};

use crate::{
    MetricsObservabilityHooks, SafeCapabilityHooks, SafeTurnHooks, TracingObservabilityHooks,
};

fn sample_call() -> CapabilityCall {
    CapabilityCall::new("call-1", "read_file", r#"{"path":"x.txt"}"#)
}

fn sample_context() -> DispatchContext {
    DispatchContext::new("conversation-1").with_trace_id("trace-1")
}

fn sample_failures() -> Vec<SessionFailure> {
    vec![SessionFailure {
        session: "files".to_string(),
        error: CapabilityError::unavailable("session closed"),
    }]
}

fn sample_result() -> TurnResult {
    TurnResult {
        session_id: SessionId::from("conversation-1"),
        assistant_message: "done".to_string(),
        rounds: 2,
        capability_calls: Vec::new(),
    }
}

fn drive_capability_hooks(hooks: &dyn CapabilityHooks) {
    let error = CapabilityError::execution("exit status 1");

    hooks.on_catalog_refreshed(3, &[]);
    hooks.on_catalog_refreshed(2, &sample_failures());
    hooks.on_session_list_failure("files", &error);
    hooks.on_session_close_failure("files", &CapabilityError::unavailable("pipe closed"));
    hooks.on_dispatch_start(&sample_call(), &sample_context());
    hooks.on_session_attempt_failure(&sample_call(), &sample_context(), "files", &error);
    hooks.on_dispatch_success(
        &sample_call(),
        &sample_context(),
        "shell",
        Duration::from_millis(20),
    );
    hooks.on_dispatch_failure(
        &sample_call(),
        &sample_context(),
        &error,
        Duration::from_millis(20),
    );
}

fn drive_turn_hooks(hooks: &dyn TurnHooks) {
    let session_id = SessionId::from("conversation-1");
    let error = ChatError::round_limit("turn exceeded 4 rounds")
        .with_phase(TurnState::AwaitingCompletion);

    hooks.on_turn_start(&session_id, "read x.txt");
    hooks.on_state_change(&session_id, TurnState::Idle, TurnState::AwaitingCompletion);
    hooks.on_round_start(&session_id, 1);
    hooks.on_capability_call_skipped(
        &session_id,
        &sample_call(),
        &CapabilityError::invalid_arguments("arguments are not valid JSON"),
    );
    hooks.on_turn_complete(&session_id, &sample_result(), Duration::from_millis(30));
    hooks.on_turn_failed(&session_id, &error, Duration::from_millis(30));
}

#[test]
fn tracing_hooks_smoke_test_all_callbacks() {
    drive_capability_hooks(&TracingObservabilityHooks);
    drive_turn_hooks(&TracingObservabilityHooks);
}

#[test]
fn metrics_hooks_smoke_test_all_callbacks() {
    drive_capability_hooks(&MetricsObservabilityHooks);
    drive_turn_hooks(&MetricsObservabilityHooks);
}

#[derive(Default, Clone)]
struct RecordingCapabilityHooks {
    events: Arc<Mutex<Vec<&'static str>>>,
}

impl CapabilityHooks for RecordingCapabilityHooks {
    fn on_catalog_refreshed(&self, _descriptors: usize, _failures: &[SessionFailure]) {
        self.events.lock().expect("events lock").push("refreshed");
    }

    fn on_session_list_failure(&self, _session: &str, _error: &CapabilityError) {
        self.events
            .lock()
            .expect("events lock")
            .push("list_failure");
    }

    fn on_session_close_failure(&self, _session: &str, _error: &CapabilityError) {
        self.events
            .lock()
            .expect("events lock")
            .push("close_failure");
    }

    fn on_dispatch_start(&self, _call: &CapabilityCall, _context: &DispatchContext) {
        self.events.lock().expect("events lock").push("start");
    }

    fn on_session_attempt_failure(
        &self,
        _call: &CapabilityCall,
        _context: &DispatchContext,
        _session: &str,
        _error: &CapabilityError,
    ) {
        self.events
            .lock()
            .expect("events lock")
            .push("attempt_failure");
    }

    fn on_dispatch_success(
        &self,
        _call: &CapabilityCall,
        _context: &DispatchContext,
        _session: &str,
        _elapsed: Duration,
    ) {
        self.events.lock().expect("events lock").push("success");
    }

    fn on_dispatch_failure(
        &self,
        _call: &CapabilityCall,
        _context: &DispatchContext,
        _error: &CapabilityError,
        _elapsed: Duration,
    ) {
        self.events.lock().expect("events lock").push("failure");
    }
}

#[derive(Default, Clone)]
struct RecordingTurnHooks {
    events: Arc<Mutex<Vec<&'static str>>>,
}

impl TurnHooks for RecordingTurnHooks {
    fn on_turn_start(&self, _session_id: &SessionId, _utterance: &str) {
        self.events.lock().expect("events lock").push("start");
    }

    fn on_state_change(&self, _session_id: &SessionId, _from: TurnState, _to: TurnState) {
        self.events.lock().expect("events lock").push("state");
    }

    fn on_round_start(&self, _session_id: &SessionId, _round: u32) {
        self.events.lock().expect("events lock").push("round");
    }

    fn on_capability_call_skipped(
        &self,
        _session_id: &SessionId,
        _call: &CapabilityCall,
        _error: &CapabilityError,
    ) {
        self.events.lock().expect("events lock").push("skipped");
    }

    fn on_turn_complete(&self, _session_id: &SessionId, _result: &TurnResult, _elapsed: Duration) {
        self.events.lock().expect("events lock").push("complete");
    }

    fn on_turn_failed(&self, _session_id: &SessionId, _error: &ChatError, _elapsed: Duration) {
        self.events.lock().expect("events lock").push("failed");
    }
}

struct PanicCapabilityHooks;

impl CapabilityHooks for PanicCapabilityHooks {
    fn on_catalog_refreshed(&self, _descriptors: usize, _failures: &[SessionFailure]) {
        panic!("refreshed panic");
    }

    fn on_session_list_failure(&self, _session: &str, _error: &CapabilityError) {
        panic!("list failure panic");
    }

    fn on_session_close_failure(&self, _session: &str, _error: &CapabilityError) {
        panic!("close failure panic");
    }

    fn on_dispatch_start(&self, _call: &CapabilityCall, _context: &DispatchContext) {
        panic!("start panic");
    }

    fn on_session_attempt_failure(
        &self,
        _call: &CapabilityCall,
        _context: &DispatchContext,
        _session: &str,
        _error: &CapabilityError,
    ) {
        panic!("attempt failure panic");
    }

    fn on_dispatch_success(
        &self,
        _call: &CapabilityCall,
        _context: &DispatchContext,
        _session: &str,
        _elapsed: Duration,
    ) {
        panic!("success panic");
    }

    fn on_dispatch_failure(
        &self,
        _call: &CapabilityCall,
        _context: &DispatchContext,
        _error: &CapabilityError,
        _elapsed: Duration,
    ) {
        panic!("failure panic");
    }
}

struct PanicTurnHooks;

impl TurnHooks for PanicTurnHooks {
    fn on_turn_start(&self, _session_id: &SessionId, _utterance: &str) {
        panic!("turn start panic");
    }

    fn on_state_change(&self, _session_id: &SessionId, _from: TurnState, _to: TurnState) {
        panic!("state change panic");
    }

    fn on_round_start(&self, _session_id: &SessionId, _round: u32) {
        panic!("round start panic");
    }

    fn on_capability_call_skipped(
        &self,
        _session_id: &SessionId,
        _call: &CapabilityCall,
        _error: &CapabilityError,
    ) {
        panic!("skipped panic");
    }

    fn on_turn_complete(&self, _session_id: &SessionId, _result: &TurnResult, _elapsed: Duration) {
        panic!("complete panic");
    }

    fn on_turn_failed(&self, _session_id: &SessionId, _error: &ChatError, _elapsed: Duration) {
        panic!("failed panic");
    }
}

#[test]
fn safe_capability_hooks_delegate_when_inner_succeeds() {
    let inner = RecordingCapabilityHooks::default();
    let events = Arc::clone(&inner.events);
    let hooks = SafeCapabilityHooks::new(inner);

    drive_capability_hooks(&hooks);

    assert_eq!(
        *events.lock().expect("events lock"),
        vec![
            "refreshed",
            "refreshed",
            "list_failure",
            "close_failure",
            "start",
            "attempt_failure",
            "success",
            "failure"
        ]
    );
}

#[test]
fn safe_turn_hooks_delegate_when_inner_succeeds() {
    let inner = RecordingTurnHooks::default();
    let events = Arc::clone(&inner.events);
    let hooks = SafeTurnHooks::new(inner);

    drive_turn_hooks(&hooks);

    assert_eq!(
        *events.lock().expect("events lock"),
        vec!["start", "state", "round", "skipped", "complete", "failed"]
    );
}

#[test]
fn safe_capability_hooks_swallow_panics() {
    drive_capability_hooks(&SafeCapabilityHooks::new(PanicCapabilityHooks));
}

#[test]
fn safe_turn_hooks_swallow_panics() {
    drive_turn_hooks(&SafeTurnHooks::new(PanicTurnHooks));
}
