//! In-process capability session backed by registered handlers.
//!
//! ```rust
//! use lprovider::CapabilityDescriptor;
//! use ltooling::{CapabilityOutput, LocalSession, required_string};
//! use serde_json::json;
//!
//! let mut session = LocalSession::new("files");
//! session.register_sync_fn(
//!     CapabilityDescriptor::new("echo", "Echoes text", json!({"type": "object"})),
//!     |args| Ok(CapabilityOutput::text(required_string(&args, "text")?)),
//! );
//!
//! assert!(session.provides("echo"));
//! ```

use std::future::Future;
use std::sync::Arc;

use lcommon::Registry;
use lprovider::CapabilityDescriptor;
use serde_json::{Map, Value};

use crate::{CapabilityError, CapabilityFuture, CapabilityOutput, CapabilitySession};

pub trait Capability: Send + Sync {
    fn descriptor(&self) -> CapabilityDescriptor;

    fn invoke<'a>(
        &'a self,
        arguments: Map<String, Value>,
    ) -> CapabilityFuture<'a, Result<CapabilityOutput, CapabilityError>>;
}

type CapabilityHandler = dyn Fn(Map<String, Value>) -> CapabilityFuture<'static, Result<CapabilityOutput, CapabilityError>>
    + Send
    + Sync;

pub struct FunctionCapability {
    descriptor: CapabilityDescriptor,
    handler: Arc<CapabilityHandler>,
}

impl FunctionCapability {
    pub fn new<F, Fut>(descriptor: CapabilityDescriptor, handler: F) -> Self
    where
        F: Fn(Map<String, Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<CapabilityOutput, CapabilityError>> + Send + 'static,
    {
        let handler: Arc<CapabilityHandler> = Arc::new(
            move |arguments| -> CapabilityFuture<'static, Result<CapabilityOutput, CapabilityError>> {
                Box::pin(handler(arguments))
            },
        );

        Self {
            descriptor,
            handler,
        }
    }
}

impl Capability for FunctionCapability {
    fn descriptor(&self) -> CapabilityDescriptor {
        self.descriptor.clone()
    }

    fn invoke<'a>(
        &'a self,
        arguments: Map<String, Value>,
    ) -> CapabilityFuture<'a, Result<CapabilityOutput, CapabilityError>> {
        (self.handler)(arguments)
    }
}

pub struct LocalSession {
    name: String,
    capabilities: Registry<String, Arc<dyn Capability>>,
}

impl LocalSession {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: Registry::new(),
        }
    }

    /// Registers a capability. Re-registering a name replaces the handler in place.
    pub fn register<T>(&mut self, capability: T)
    where
        T: Capability + 'static,
    {
        let name = capability.descriptor().name;
        self.capabilities.insert(name, Arc::new(capability));
    }

    pub fn register_fn<F, Fut>(&mut self, descriptor: CapabilityDescriptor, handler: F)
    where
        F: Fn(Map<String, Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<CapabilityOutput, CapabilityError>> + Send + 'static,
    {
        self.register(FunctionCapability::new(descriptor, handler));
    }

    pub fn register_sync_fn<F>(&mut self, descriptor: CapabilityDescriptor, handler: F)
    where
        F: Fn(Map<String, Value>) -> Result<CapabilityOutput, CapabilityError>
            + Send
            + Sync
            + 'static,
    {
        self.register_fn(descriptor, move |arguments| {
            let output = handler(arguments);
            async move { output }
        });
    }

    pub fn provides(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl CapabilitySession for LocalSession {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_capabilities<'a>(
        &'a self,
    ) -> CapabilityFuture<'a, Result<Vec<CapabilityDescriptor>, CapabilityError>> {
        Box::pin(async move {
            Ok(self
                .capabilities
                .values()
                .map(|capability| capability.descriptor())
                .collect())
        })
    }

    fn invoke<'a>(
        &'a self,
        name: &'a str,
        arguments: Map<String, Value>,
    ) -> CapabilityFuture<'a, Result<CapabilityOutput, CapabilityError>> {
        Box::pin(async move {
            let capability = self.capabilities.get(name).cloned().ok_or_else(|| {
                CapabilityError::not_found(format!(
                    "capability '{name}' is not provided by session '{}'",
                    self.name
                ))
                .with_capability(name)
                .with_session(self.name.clone())
            })?;

            capability
                .invoke(arguments)
                .await
                .map_err(|error| error.with_capability(name).with_session(self.name.clone()))
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{CapabilityErrorKind, required_string};

    fn descriptor(name: &str) -> CapabilityDescriptor {
        CapabilityDescriptor::new(name, format!("{name} capability"), json!({"type": "object"}))
    }

    #[tokio::test]
    async fn lists_capabilities_in_registration_order() {
        let mut session = LocalSession::new("files");
        session.register_sync_fn(descriptor("write_file"), |_| Ok(CapabilityOutput::empty()));
        session.register_sync_fn(descriptor("read_file"), |_| Ok(CapabilityOutput::empty()));
        session.register_sync_fn(descriptor("write_file"), |_| {
            Ok(CapabilityOutput::text("replaced"))
        });

        let names: Vec<String> = session
            .list_capabilities()
            .await
            .expect("listing should succeed")
            .into_iter()
            .map(|descriptor| descriptor.name)
            .collect();

        assert_eq!(names, vec!["write_file", "read_file"]);
        assert_eq!(session.len(), 2);

        let output = session
            .invoke("write_file", Map::new())
            .await
            .expect("replaced handler should run");
        assert_eq!(output.to_text(), "replaced");
    }

    #[tokio::test]
    async fn invoke_passes_arguments_to_async_handler() {
        let mut session = LocalSession::new("files");
        session.register_fn(descriptor("read_file"), |args| async move {
            let path = required_string(&args, "path")?;
            Ok(CapabilityOutput::text(format!("contents of {path}")))
        });

        let mut args = Map::new();
        args.insert("path".to_string(), json!("x.txt"));

        let output = session.invoke("read_file", args).await.expect("read should succeed");
        assert_eq!(output.to_text(), "contents of x.txt");
    }

    #[tokio::test]
    async fn unknown_capability_is_not_found_with_context() {
        let session = LocalSession::new("terminal");

        let error = session
            .invoke("missing", Map::new())
            .await
            .expect_err("unknown name should fail");

        assert_eq!(error.kind, CapabilityErrorKind::NotFound);
        assert_eq!(error.session.as_deref(), Some("terminal"));
        assert_eq!(error.capability.as_deref(), Some("missing"));
    }

    #[tokio::test]
    async fn handler_errors_gain_session_context() {
        let mut session = LocalSession::new("terminal");
        session.register_sync_fn(descriptor("run_cmd"), |_| {
            Err(CapabilityError::execution("exit status 2"))
        });

        let error = session
            .invoke("run_cmd", Map::new())
            .await
            .expect_err("handler error should surface");

        assert_eq!(error.kind, CapabilityErrorKind::Execution);
        assert_eq!(error.session.as_deref(), Some("terminal"));
    }
}
