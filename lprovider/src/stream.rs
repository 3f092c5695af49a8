//! Streaming fragment contracts and an in-memory stream.
//!
//! ```rust
//! use lprovider::{BoxedFragmentStream, Fragment, VecFragmentStream};
//!
//! let stream = VecFragmentStream::new(vec![Ok(Fragment::text("hello"))]);
//! let _boxed: BoxedFragmentStream<'static> = Box::pin(stream);
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::ProviderError;

/// Partial capability call. Fragments sharing an `index` belong to the same call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapabilityCallFragment {
    pub index: u32,
    pub id: Option<String>,
    pub name: Option<String>,
    pub arguments_delta: Option<String>,
}

impl CapabilityCallFragment {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_arguments_delta(mut self, delta: impl Into<String>) -> Self {
        self.arguments_delta = Some(delta.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    TextDelta(String),
    CapabilityCallDelta(CapabilityCallFragment),
}

impl Fragment {
    pub fn text(delta: impl Into<String>) -> Self {
        Self::TextDelta(delta.into())
    }

    pub fn call(fragment: CapabilityCallFragment) -> Self {
        Self::CapabilityCallDelta(fragment)
    }
}

/// Completion stream contract.
///
/// Invariants for consumers:
/// - Fragments are emitted in source order.
/// - An `Err` item is terminal; consumers stop polling after it.
/// - Once the stream yields `None`, it must not yield additional items.
pub trait FragmentStream: Stream<Item = Result<Fragment, ProviderError>> + Send {}

impl<T> FragmentStream for T where T: Stream<Item = Result<Fragment, ProviderError>> + Send {}

pub type BoxedFragmentStream<'a> = Pin<Box<dyn FragmentStream + 'a>>;

#[derive(Debug)]
pub struct VecFragmentStream {
    fragments: VecDeque<Result<Fragment, ProviderError>>,
}

impl VecFragmentStream {
    pub fn new(fragments: Vec<Result<Fragment, ProviderError>>) -> Self {
        Self {
            fragments: fragments.into(),
        }
    }
}

impl Stream for VecFragmentStream {
    type Item = Result<Fragment, ProviderError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Fragment, ProviderError>>> {
        Poll::Ready(self.fragments.pop_front())
    }
}
