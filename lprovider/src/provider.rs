use std::future::Future;
use std::pin::Pin;

use crate::{BoxedFragmentStream, CompletionRequest, ProviderError};

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Streaming completion channel to a model.
///
/// Wire encoding lives behind this trait; the orchestration loop only sees fragments.
pub trait CompletionClient: Send + Sync {
    fn name(&self) -> &str;

    fn stream<'a>(
        &'a self,
        request: CompletionRequest,
    ) -> ProviderFuture<'a, Result<BoxedFragmentStream<'a>, ProviderError>>;
}
