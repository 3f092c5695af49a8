//! Lifecycle hooks for catalog refreshes and capability dispatch.
//!
//! ```rust
//! use ltooling::{CapabilityHooks, NoopCapabilityHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn CapabilityHooks) {}
//!
//! let hooks = NoopCapabilityHooks;
//! assert_hooks_trait(&hooks);
//! ```

use std::time::Duration;

use lprovider::CapabilityCall;

use crate::{CapabilityError, DispatchContext, SessionFailure};

pub trait CapabilityHooks: Send + Sync {
    fn on_catalog_refreshed(&self, _descriptors: usize, _failures: &[SessionFailure]) {}

    fn on_session_list_failure(&self, _session: &str, _error: &CapabilityError) {}

    fn on_session_close_failure(&self, _session: &str, _error: &CapabilityError) {}

    fn on_dispatch_start(&self, _call: &CapabilityCall, _context: &DispatchContext) {}

    /// One session declined or failed; the dispatcher moves on to the next candidate.
    fn on_session_attempt_failure(
        &self,
        _call: &CapabilityCall,
        _context: &DispatchContext,
        _session: &str,
        _error: &CapabilityError,
    ) {
    }

    fn on_dispatch_success(
        &self,
        _call: &CapabilityCall,
        _context: &DispatchContext,
        _session: &str,
        _elapsed: Duration,
    ) {
    }

    fn on_dispatch_failure(
        &self,
        _call: &CapabilityCall,
        _context: &DispatchContext,
        _error: &CapabilityError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCapabilityHooks;

impl CapabilityHooks for NoopCapabilityHooks {}
