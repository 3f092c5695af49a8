//! Message model and streaming completion contract.

mod accumulate;
mod error;
mod model;
mod provider;
mod stream;

pub mod prelude;

pub use accumulate::StreamAccumulator;
pub use error::{ProviderError, ProviderErrorKind};
pub use model::{
    AssistantMessage, CapabilityCall, CapabilityDescriptor, CompletionRequest,
    CompletionRequestBuilder, Message, Role,
};
pub use provider::{CompletionClient, ProviderFuture};
pub use stream::{
    BoxedFragmentStream, CapabilityCallFragment, Fragment, FragmentStream, VecFragmentStream,
};
