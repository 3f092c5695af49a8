//! Common `lprovider` imports for downstream crates.

pub use crate::{
    AssistantMessage, BoxedFragmentStream, CapabilityCall, CapabilityCallFragment,
    CapabilityDescriptor, CompletionClient, CompletionRequest, CompletionRequestBuilder, Fragment,
    FragmentStream, Message, ProviderError, ProviderErrorKind, ProviderFuture, Role,
    StreamAccumulator, VecFragmentStream,
};
pub use lcommon::{BoxFuture, GenerationOptions, MetadataMap};
