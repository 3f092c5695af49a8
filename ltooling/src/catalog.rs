//! Aggregated, normalized capability catalog.
//!
//! A catalog is rebuilt wholesale from every registered session on each refresh; entries are
//! never patched in place. Sessions that fail to list their capabilities are logged and skipped.

use lcommon::Registry;
use lprovider::CapabilityDescriptor;

use crate::{
    CapabilityError, CapabilityHooks, DEFAULT_IDENTITY_PARAMETER, SessionRegistry,
    normalize_descriptor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Keep every descriptor; the first registered session is tried first.
    #[default]
    FirstWins,
    /// Fail the refresh when two descriptors share a name.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPolicy {
    pub duplicates: DuplicatePolicy,
    pub reserved_parameter: String,
}

impl Default for CatalogPolicy {
    fn default() -> Self {
        Self {
            duplicates: DuplicatePolicy::default(),
            reserved_parameter: DEFAULT_IDENTITY_PARAMETER.to_string(),
        }
    }
}

impl CatalogPolicy {
    pub fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    pub fn with_reserved_parameter(mut self, reserved_parameter: impl Into<String>) -> Self {
        self.reserved_parameter = reserved_parameter.into();
        self
    }

    pub fn validate(&self) -> Result<(), CapabilityError> {
        if self.reserved_parameter.trim().is_empty() {
            return Err(CapabilityError::registration(
                "reserved parameter name must not be empty",
            ));
        }

        Ok(())
    }
}

/// A session that could not list its capabilities during a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    pub session: String,
    pub error: CapabilityError,
}

#[derive(Debug, Clone, Default)]
pub struct CapabilityCatalog {
    descriptors: Vec<CapabilityDescriptor>,
    owners: Vec<usize>,
    index: Registry<String, Vec<usize>>,
    failures: Vec<SessionFailure>,
}

impl CapabilityCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub async fn refresh(
        sessions: &SessionRegistry,
        policy: &CatalogPolicy,
        hooks: &dyn CapabilityHooks,
    ) -> Result<Self, CapabilityError> {
        policy.validate()?;

        let mut catalog = Self::empty();

        for (session_index, session) in sessions.iter().enumerate() {
            let listed = match session.list_capabilities().await {
                Ok(listed) => listed,
                Err(error) => {
                    let error = error.with_session(session.name());
                    tracing::warn!(
                        phase = "catalog",
                        event = "session_list_failure",
                        session = session.name(),
                        error_kind = ?error.kind,
                        error = %error
                    );
                    hooks.on_session_list_failure(session.name(), &error);
                    catalog.failures.push(SessionFailure {
                        session: session.name().to_string(),
                        error,
                    });
                    continue;
                }
            };

            for descriptor in listed {
                if descriptor.name.trim().is_empty() {
                    tracing::warn!(
                        phase = "catalog",
                        event = "unnamed_capability",
                        session = session.name()
                    );
                    continue;
                }

                let descriptor = normalize_descriptor(descriptor, &policy.reserved_parameter);
                catalog.insert(descriptor, session_index, sessions, policy.duplicates)?;
            }
        }

        hooks.on_catalog_refreshed(catalog.descriptors.len(), &catalog.failures);
        Ok(catalog)
    }

    fn insert(
        &mut self,
        descriptor: CapabilityDescriptor,
        session_index: usize,
        sessions: &SessionRegistry,
        duplicates: DuplicatePolicy,
    ) -> Result<(), CapabilityError> {
        let session_name = |index: usize| {
            sessions
                .get(index)
                .map(|session| session.name().to_string())
                .unwrap_or_default()
        };

        if let Some(&first_owner) = self.owners(&descriptor.name).first() {
            match duplicates {
                DuplicatePolicy::Reject => {
                    return Err(CapabilityError::duplicate_capability(format!(
                        "capability '{}' is advertised by '{}' and '{}'",
                        descriptor.name,
                        session_name(first_owner),
                        session_name(session_index)
                    ))
                    .with_capability(descriptor.name.clone())
                    .with_session(session_name(session_index)));
                }
                DuplicatePolicy::FirstWins => {
                    tracing::warn!(
                        phase = "catalog",
                        event = "duplicate_capability",
                        capability = %descriptor.name,
                        session = session_name(session_index),
                        preferred_session = session_name(first_owner)
                    );
                }
            }
        }

        let owners = self
            .index
            .get_or_insert_with(descriptor.name.clone(), Vec::new);
        if !owners.contains(&session_index) {
            owners.push(session_index);
        }

        self.descriptors.push(descriptor);
        self.owners.push(session_index);
        Ok(())
    }

    pub fn descriptors(&self) -> &[CapabilityDescriptor] {
        &self.descriptors
    }

    /// First descriptor advertised under `name`.
    pub fn descriptor(&self, name: &str) -> Option<&CapabilityDescriptor> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.name == name)
    }

    /// Indices of the sessions advertising `name`, in registration order.
    pub fn owners(&self, name: &str) -> &[usize] {
        self.index.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Dispatch order for `name`: advertising sessions first, then every other session so that
    /// providers which serve unadvertised names are still reached.
    pub fn candidate_sessions(&self, name: &str, session_count: usize) -> Vec<usize> {
        let owners = self.owners(name);
        let mut candidates = Vec::with_capacity(session_count);
        candidates.extend(owners.iter().copied().filter(|index| *index < session_count));
        candidates.extend((0..session_count).filter(|index| !owners.contains(index)));
        candidates
    }

    pub fn failures(&self) -> &[SessionFailure] {
        &self.failures
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Map, Value, json};

    use super::*;
    use crate::{
        CapabilityErrorKind, CapabilityFuture, CapabilityOutput, CapabilitySession, LocalSession,
        NoopCapabilityHooks,
    };

    struct BrokenSession;

    impl CapabilitySession for BrokenSession {
        fn name(&self) -> &str {
            "broken"
        }

        fn list_capabilities<'a>(
            &'a self,
        ) -> CapabilityFuture<'a, Result<Vec<CapabilityDescriptor>, CapabilityError>> {
            Box::pin(async { Err(CapabilityError::unavailable("process exited")) })
        }

        fn invoke<'a>(
            &'a self,
            _name: &'a str,
            _arguments: Map<String, Value>,
        ) -> CapabilityFuture<'a, Result<CapabilityOutput, CapabilityError>> {
            Box::pin(async { Err(CapabilityError::unavailable("process exited")) })
        }
    }

    fn session(name: &str, capabilities: &[(&str, Value)]) -> Arc<dyn CapabilitySession> {
        let mut session = LocalSession::new(name);
        for (capability, schema) in capabilities {
            session.register_sync_fn(
                CapabilityDescriptor::new(*capability, "", schema.clone()),
                |_| Ok(CapabilityOutput::empty()),
            );
        }
        Arc::new(session)
    }

    fn registry(sessions: Vec<Arc<dyn CapabilitySession>>) -> SessionRegistry {
        let mut registry = SessionRegistry::new();
        for session in sessions {
            registry.register(session).expect("unique session names");
        }
        registry
    }

    #[tokio::test]
    async fn refresh_aggregates_in_provider_then_listing_order() {
        let sessions = registry(vec![
            session("files", &[("read_file", Value::Null), ("write_file", Value::Null)]),
            session("terminal", &[("run_cmd", json!({"type": "object"}))]),
        ]);

        let catalog =
            CapabilityCatalog::refresh(&sessions, &CatalogPolicy::default(), &NoopCapabilityHooks)
                .await
                .expect("refresh should succeed");

        let names: Vec<&str> = catalog
            .descriptors()
            .iter()
            .map(|descriptor| descriptor.name.as_str())
            .collect();
        assert_eq!(names, vec!["read_file", "write_file", "run_cmd"]);
        assert_eq!(
            catalog.descriptor("read_file").map(|d| d.parameters.clone()),
            Some(json!({"type": "object", "properties": {}}))
        );
        assert_eq!(catalog.owners("run_cmd"), &[1]);
        assert!(!catalog.is_partial());
    }

    #[tokio::test]
    async fn failing_session_is_skipped_and_recorded() {
        let sessions = registry(vec![
            Arc::new(BrokenSession),
            session("terminal", &[("run_cmd", Value::Null)]),
        ]);

        let catalog =
            CapabilityCatalog::refresh(&sessions, &CatalogPolicy::default(), &NoopCapabilityHooks)
                .await
                .expect("partial failure is not an error");

        assert_eq!(catalog.len(), 1);
        assert!(catalog.is_partial());
        assert_eq!(catalog.failures()[0].session, "broken");
        assert_eq!(catalog.failures()[0].error.kind, CapabilityErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn all_sessions_failing_yields_empty_catalog() {
        let sessions = registry(vec![Arc::new(BrokenSession)]);

        let catalog =
            CapabilityCatalog::refresh(&sessions, &CatalogPolicy::default(), &NoopCapabilityHooks)
                .await
                .expect("empty catalog is not an error");

        assert!(catalog.is_empty());
        assert_eq!(catalog.failures().len(), 1);
    }

    #[tokio::test]
    async fn duplicates_are_kept_under_first_wins_and_indexed_in_order() {
        let sessions = registry(vec![
            session("a", &[("run_cmd", Value::Null)]),
            session("b", &[("run_cmd", Value::Null), ("status", Value::Null)]),
        ]);

        let catalog =
            CapabilityCatalog::refresh(&sessions, &CatalogPolicy::default(), &NoopCapabilityHooks)
                .await
                .expect("duplicates are allowed by default");

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.owners("run_cmd"), &[0, 1]);
        assert_eq!(catalog.candidate_sessions("status", 2), vec![1, 0]);
        assert_eq!(catalog.candidate_sessions("unknown", 2), vec![0, 1]);
    }

    #[tokio::test]
    async fn duplicates_fail_refresh_under_reject_policy() {
        let sessions = registry(vec![
            session("a", &[("run_cmd", Value::Null)]),
            session("b", &[("run_cmd", Value::Null)]),
        ]);
        let policy = CatalogPolicy::default().with_duplicates(DuplicatePolicy::Reject);

        let error = CapabilityCatalog::refresh(&sessions, &policy, &NoopCapabilityHooks)
            .await
            .expect_err("duplicate should be rejected");

        assert_eq!(error.kind, CapabilityErrorKind::DuplicateCapability);
        assert!(error.message.contains("'a' and 'b'"));
    }

    #[tokio::test]
    async fn reserved_parameter_is_stripped_from_catalog() {
        let sessions = registry(vec![session(
            "files",
            &[(
                "read_file",
                json!({"properties": {"path": {}, "owner": {}}, "required": ["path", "owner"]}),
            )],
        )]);
        let policy = CatalogPolicy::default().with_reserved_parameter("owner");

        let catalog = CapabilityCatalog::refresh(&sessions, &policy, &NoopCapabilityHooks)
            .await
            .expect("refresh should succeed");

        let descriptor = catalog.descriptor("read_file").expect("descriptor");
        assert!(descriptor.parameters["properties"].get("owner").is_none());
        assert_eq!(descriptor.parameters["required"], json!(["path"]));
    }
}
