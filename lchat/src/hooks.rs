//! Lifecycle hooks for conversation turns.

use std::time::Duration;

use lcommon::SessionId;
use lprovider::CapabilityCall;
use ltooling::CapabilityError;

use crate::{ChatError, TurnResult, TurnState};

pub trait TurnHooks: Send + Sync {
    fn on_turn_start(&self, _session_id: &SessionId, _utterance: &str) {}

    fn on_state_change(&self, _session_id: &SessionId, _from: TurnState, _to: TurnState) {}

    fn on_round_start(&self, _session_id: &SessionId, _round: u32) {}

    fn on_capability_call_skipped(
        &self,
        _session_id: &SessionId,
        _call: &CapabilityCall,
        _error: &CapabilityError,
    ) {
    }

    fn on_turn_complete(&self, _session_id: &SessionId, _result: &TurnResult, _elapsed: Duration) {
    }

    fn on_turn_failed(&self, _session_id: &SessionId, _error: &ChatError, _elapsed: Duration) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTurnHooks;

impl TurnHooks for NoopTurnHooks {}
