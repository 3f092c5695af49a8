//! Capability dispatch across registered sessions.
//!
//! A call is tried against the sessions advertising its name first, then against every other
//! session in registration order. The first session that answers without error wins and no
//! further session is called.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_timer::Delay;
use futures_util::future::{Either, select};
use lprovider::CapabilityCall;
use serde_json::{Map, Value};

use crate::{
    CapabilityCatalog, CapabilityError, CapabilityHooks, CapabilityOutput, CapabilitySession,
    DEFAULT_IDENTITY_PARAMETER, DispatchContext, DispatchOutcome, NoopCapabilityHooks,
    SessionRegistry, validate_arguments,
};

pub const DEFAULT_IDENTITY_VALUE: &str = "anonymous";

/// Identity argument injected into every dispatched call. Never advertised to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub parameter: String,
    pub value: String,
}

impl UserIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            parameter: DEFAULT_IDENTITY_PARAMETER.to_string(),
            value: value.into(),
        }
    }

    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = parameter.into();
        self
    }

    /// Overwrites any model-supplied value for the identity parameter.
    pub fn inject(&self, arguments: &mut Map<String, Value>) {
        arguments.insert(self.parameter.clone(), Value::String(self.value.clone()));
    }
}

impl Default for UserIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_IDENTITY_VALUE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchPolicy {
    pub identity: UserIdentity,
    /// Deadline for a single session attempt. `None` waits indefinitely.
    pub call_timeout: Option<Duration>,
}

impl DispatchPolicy {
    pub fn with_identity(mut self, identity: UserIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = Some(call_timeout);
        self
    }

    pub fn validate(&self) -> Result<(), CapabilityError> {
        if self.identity.parameter.trim().is_empty() {
            return Err(CapabilityError::registration(
                "identity parameter name must not be empty",
            ));
        }

        if self.call_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(CapabilityError::registration(
                "call_timeout must be greater than zero",
            ));
        }

        Ok(())
    }
}

#[derive(Clone)]
pub struct CapabilityDispatcher {
    policy: DispatchPolicy,
    hooks: Arc<dyn CapabilityHooks>,
}

impl CapabilityDispatcher {
    pub fn new(policy: DispatchPolicy) -> Self {
        Self {
            policy,
            hooks: Arc::new(NoopCapabilityHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn CapabilityHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn policy(&self) -> &DispatchPolicy {
        &self.policy
    }

    pub async fn dispatch(
        &self,
        sessions: &SessionRegistry,
        catalog: &CapabilityCatalog,
        call: &CapabilityCall,
        arguments: Map<String, Value>,
        context: &DispatchContext,
    ) -> Result<DispatchOutcome, CapabilityError> {
        let started_at = Instant::now();
        self.hooks.on_dispatch_start(call, context);

        let result = self
            .dispatch_inner(sessions, catalog, call, arguments, context)
            .await;

        let elapsed = started_at.elapsed();
        match &result {
            Ok(outcome) => {
                self.hooks
                    .on_dispatch_success(call, context, &outcome.session, elapsed)
            }
            Err(error) => self.hooks.on_dispatch_failure(call, context, error, elapsed),
        }

        result
    }

    async fn dispatch_inner(
        &self,
        sessions: &SessionRegistry,
        catalog: &CapabilityCatalog,
        call: &CapabilityCall,
        mut arguments: Map<String, Value>,
        context: &DispatchContext,
    ) -> Result<DispatchOutcome, CapabilityError> {
        if let Some(descriptor) = catalog.descriptor(&call.name) {
            validate_arguments(descriptor, &arguments)?;
        }

        self.policy.identity.inject(&mut arguments);

        let candidates = catalog.candidate_sessions(&call.name, sessions.len());
        if candidates.is_empty() {
            return Err(CapabilityError::not_found(format!(
                "capability '{}' cannot be dispatched: no sessions are registered",
                call.name
            ))
            .with_capability(call.name.clone()));
        }

        let mut failures = Vec::new();
        for index in candidates {
            let Some(session) = sessions.get(index) else {
                continue;
            };

            match self
                .invoke_with_deadline(session.as_ref(), &call.name, arguments.clone())
                .await
            {
                Ok(output) => return Ok(DispatchOutcome::new(call, session.name(), output)),
                Err(error) => {
                    let error = error.with_session(session.name());
                    tracing::debug!(
                        phase = "dispatch",
                        event = "session_attempt_failure",
                        capability = %call.name,
                        call_id = %call.id,
                        session = session.name(),
                        error_kind = ?error.kind
                    );
                    self.hooks
                        .on_session_attempt_failure(call, context, session.name(), &error);
                    failures.push(error);
                }
            }
        }

        Err(aggregate_failures(&call.name, &failures))
    }

    async fn invoke_with_deadline(
        &self,
        session: &dyn CapabilitySession,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<CapabilityOutput, CapabilityError> {
        let invocation = session.invoke(name, arguments);
        let Some(timeout) = self.policy.call_timeout else {
            return invocation.await;
        };

        match select(invocation, Delay::new(timeout)).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(CapabilityError::timeout(format!(
                "no result within {}ms",
                timeout.as_millis()
            ))
            .with_capability(name)),
        }
    }
}

/// Folds every session error into one. A session that took the call and failed, including by
/// rejecting its arguments, outranks sessions that declined it and keeps its own kind.
fn aggregate_failures(name: &str, failures: &[CapabilityError]) -> CapabilityError {
    let detail = failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");

    match failures.iter().find(|error| error.is_accepted_failure()) {
        Some(accepted) => {
            let mut error = CapabilityError::new(
                accepted.kind,
                format!("capability '{name}' failed in every session: {detail}"),
                accepted.retryable,
            )
            .with_capability(name);
            error.session = accepted.session.clone();
            error
        }
        None => CapabilityError::not_found(format!(
            "capability '{name}' was not accepted by any session: {detail}"
        ))
        .with_capability(name),
    }
}
