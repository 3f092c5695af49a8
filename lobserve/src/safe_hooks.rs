use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use lchat::{ChatError, TurnHooks, TurnResult, TurnState};
use lcommon::SessionId;
use lprovider::CapabilityCall;
use ltooling::{CapabilityError, CapabilityHooks, DispatchContext, SessionFailure};

/// Wraps capability hooks so a panicking observer cannot take down a dispatch.
pub struct SafeCapabilityHooks<H> {
    inner: H,
}

impl<H> SafeCapabilityHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> CapabilityHooks for SafeCapabilityHooks<H>
where
    H: CapabilityHooks,
{
    fn on_catalog_refreshed(&self, descriptors: usize, failures: &[SessionFailure]) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_catalog_refreshed(descriptors, failures)
        }));
    }

    fn on_session_list_failure(&self, session: &str, error: &CapabilityError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_session_list_failure(session, error)
        }));
    }

    fn on_session_close_failure(&self, session: &str, error: &CapabilityError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_session_close_failure(session, error)
        }));
    }

    fn on_dispatch_start(&self, call: &CapabilityCall, context: &DispatchContext) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_dispatch_start(call, context)
        }));
    }

    fn on_session_attempt_failure(
        &self,
        call: &CapabilityCall,
        context: &DispatchContext,
        session: &str,
        error: &CapabilityError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_session_attempt_failure(call, context, session, error)
        }));
    }

    fn on_dispatch_success(
        &self,
        call: &CapabilityCall,
        context: &DispatchContext,
        session: &str,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_dispatch_success(call, context, session, elapsed)
        }));
    }

    fn on_dispatch_failure(
        &self,
        call: &CapabilityCall,
        context: &DispatchContext,
        error: &CapabilityError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_dispatch_failure(call, context, error, elapsed)
        }));
    }
}

pub struct SafeTurnHooks<H> {
    inner: H,
}

impl<H> SafeTurnHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> TurnHooks for SafeTurnHooks<H>
where
    H: TurnHooks,
{
    fn on_turn_start(&self, session_id: &SessionId, utterance: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_start(session_id, utterance)
        }));
    }

    fn on_state_change(&self, session_id: &SessionId, from: TurnState, to: TurnState) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_state_change(session_id, from, to)
        }));
    }

    fn on_round_start(&self, session_id: &SessionId, round: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_round_start(session_id, round)
        }));
    }

    fn on_capability_call_skipped(
        &self,
        session_id: &SessionId,
        call: &CapabilityCall,
        error: &CapabilityError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_capability_call_skipped(session_id, call, error)
        }));
    }

    fn on_turn_complete(&self, session_id: &SessionId, result: &TurnResult, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_complete(session_id, result, elapsed)
        }));
    }

    fn on_turn_failed(&self, session_id: &SessionId, error: &ChatError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_failed(session_id, error, elapsed)
        }));
    }
}
