//! Capability layer: provider sessions, the aggregated catalog and call dispatch.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use lprovider::CapabilityDescriptor;
//! use ltooling::prelude::*;
//! use serde_json::json;
//!
//! let mut files = LocalSession::new("files");
//! files.register_sync_fn(
//!     CapabilityDescriptor::new("read_file", "Reads a file", json!({"properties": {"path": {}}})),
//!     |args| Ok(CapabilityOutput::text(format!("read {}", required_string(&args, "path")?))),
//! );
//!
//! let mut sessions = SessionRegistry::new();
//! sessions.register(Arc::new(files)).expect("unique name");
//!
//! let dispatcher = CapabilityDispatcher::new(
//!     DispatchPolicy::default().with_identity(UserIdentity::new("user-1")),
//! );
//! assert_eq!(sessions.names(), vec!["files"]);
//! assert_eq!(dispatcher.policy().identity.parameter, "uid");
//! ```

mod args;
mod catalog;
mod dispatch;
mod error;
mod hooks;
mod local;
mod schema;
mod session;
mod types;

pub mod prelude {
    pub use crate::{
        CapabilityCatalog, CapabilityContent, CapabilityDispatcher, CapabilityError,
        CapabilityErrorKind, CapabilityFuture, CapabilityHooks, CapabilityOutput,
        CapabilitySession, CatalogPolicy, DispatchContext, DispatchOutcome, DispatchPolicy,
        DuplicatePolicy, LocalSession, NoopCapabilityHooks, SessionRegistry, UserIdentity,
        parse_arguments, required_string,
    };
}

pub use args::{optional_string, parse_arguments, required_string};
pub use catalog::{CapabilityCatalog, CatalogPolicy, DuplicatePolicy, SessionFailure};
pub use dispatch::{CapabilityDispatcher, DEFAULT_IDENTITY_VALUE, DispatchPolicy, UserIdentity};
pub use error::{CapabilityError, CapabilityErrorKind};
pub use hooks::{CapabilityHooks, NoopCapabilityHooks};
pub use local::{Capability, FunctionCapability, LocalSession};
pub use schema::{
    DEFAULT_IDENTITY_PARAMETER, normalize_descriptor, normalize_schema, validate_arguments,
};
pub use session::{
    CapabilityContent, CapabilityFuture, CapabilityOutput, CapabilitySession, EMPTY_OUTPUT_TEXT,
    SessionRegistry,
};
pub use types::{DispatchContext, DispatchOutcome};
