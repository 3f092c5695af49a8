//! Primitives shared by every lattice crate: boxed futures, identifiers, generation settings,
//! ordered registries and turn cancellation.
//!
//! ```rust
//! use lcommon::{CancellationToken, GenerationOptions, SessionId, TraceId};
//!
//! let session = SessionId::from("conversation-1");
//! let options = GenerationOptions::default().with_temperature(0.3);
//! let cancel = CancellationToken::new();
//!
//! assert_eq!(TraceId::for_turn(&session, 1).to_string(), "conversation-1/turn-1");
//! assert_eq!(options.temperature, Some(0.3));
//! assert!(!cancel.is_cancelled());
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use lcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Identifier newtypes shared by the conversation and dispatch layers.
    //!
    //! ```rust
    //! use lcommon::{SessionId, TraceId};
    //!
    //! let session = SessionId::new("conversation-7");
    //! let trace = TraceId::for_turn(&session, 3);
    //!
    //! assert_eq!(trace.as_str(), "conversation-7/turn-3");
    //! assert_eq!(session, "conversation-7");
    //! ```

    use std::collections::HashMap;
    use std::fmt;

    /// Free-form string annotations attached to requests and dispatch contexts.
    pub type MetadataMap = HashMap<String, String>;

    macro_rules! string_id {
        ($(#[$meta:meta])* $name:ident) => {
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(String);

            impl $name {
                pub fn new(value: impl Into<String>) -> Self {
                    Self(value.into())
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<String> for $name {
                fn from(value: String) -> Self {
                    Self(value)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }

            impl PartialEq<&str> for $name {
                fn eq(&self, other: &&str) -> bool {
                    self.0 == *other
                }
            }
        };
    }

    string_id!(
        /// Names one conversation.
        SessionId
    );

    string_id!(
        /// Correlates the completion requests and capability dispatches of one turn.
        TraceId
    );

    impl TraceId {
        pub fn for_turn(session: &SessionId, turn: u64) -> Self {
            Self(format!("{session}/turn-{turn}"))
        }
    }
}

pub mod model {
    //! Shared generation settings used by completion requests.
    //!
    //! ```rust
    //! use lcommon::GenerationOptions;
    //!
    //! let options = GenerationOptions::default()
    //!     .with_temperature(0.2)
    //!     .with_max_tokens(128)
    //!     .enable_streaming();
    //!
    //! assert_eq!(options.temperature, Some(0.2));
    //! assert_eq!(options.max_tokens, Some(128));
    //! assert!(options.stream);
    //! ```

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct GenerationOptions {
        pub temperature: Option<f32>,
        pub max_tokens: Option<u32>,
        pub stream: bool,
    }

    impl GenerationOptions {
        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = Some(temperature);
            self
        }

        pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
            self.max_tokens = Some(max_tokens);
            self
        }

        pub fn with_streaming(mut self, stream: bool) -> Self {
            self.stream = stream;
            self
        }

        pub fn enable_streaming(self) -> Self {
            self.with_streaming(true)
        }
    }
}

pub mod registry {
    //! Keyed storage that remembers insertion order.
    //!
    //! Replacing a value keeps its original slot, so listings stay stable across re-registration.
    //!
    //! ```rust
    //! use lcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("write".to_string(), 1_u32);
    //! registry.insert("read".to_string(), 2);
    //! registry.insert("write".to_string(), 3);
    //!
    //! assert_eq!(registry.values().copied().collect::<Vec<_>>(), vec![3, 2]);
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        slots: HashMap<K, usize>,
        entries: Vec<(K, V)>,
    }

    impl<K, V> Default for Registry<K, V> {
        fn default() -> Self {
            Self {
                slots: HashMap::new(),
                entries: Vec::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash + Clone,
    {
        pub fn new() -> Self {
            Self::default()
        }

        /// Returns the replaced value when `key` was already present.
        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            match self.slots.get(&key) {
                Some(&slot) => Some(std::mem::replace(&mut self.entries[slot].1, value)),
                None => {
                    self.slots.insert(key.clone(), self.entries.len());
                    self.entries.push((key, value));
                    None
                }
            }
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.slots.get(key).map(|&slot| &self.entries[slot].1)
        }

        pub fn get_or_insert_with(&mut self, key: K, default: impl FnOnce() -> V) -> &mut V {
            let slot = match self.slots.get(&key) {
                Some(&slot) => slot,
                None => {
                    let slot = self.entries.len();
                    self.slots.insert(key.clone(), slot);
                    self.entries.push((key, default()));
                    slot
                }
            };
            &mut self.entries[slot].1
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.slots.contains_key(key)
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.entries.iter().map(|(_, value)| value)
        }

        pub fn len(&self) -> usize {
            self.entries.len()
        }

        pub fn is_empty(&self) -> bool {
            self.entries.is_empty()
        }
    }
}

pub mod cancel {
    //! Turn-wide cancellation signal.
    //!
    //! Clones share one flag; cancelling any clone wakes every pending
    //! [`CancellationToken::cancelled`] future.
    //!
    //! ```rust
    //! use lcommon::CancellationToken;
    //!
    //! let token = CancellationToken::new();
    //! let observer = token.clone();
    //! token.cancel();
    //! assert!(observer.is_cancelled());
    //! ```

    use std::sync::Arc;

    use tokio::sync::watch;

    #[derive(Debug, Clone)]
    pub struct CancellationToken {
        sender: Arc<watch::Sender<bool>>,
    }

    impl Default for CancellationToken {
        fn default() -> Self {
            Self::new()
        }
    }

    impl CancellationToken {
        pub fn new() -> Self {
            let (sender, _receiver) = watch::channel(false);
            Self {
                sender: Arc::new(sender),
            }
        }

        pub fn cancel(&self) {
            self.sender.send_replace(true);
        }

        pub fn is_cancelled(&self) -> bool {
            *self.sender.borrow()
        }

        /// Resolves once the token is cancelled. Never resolves otherwise.
        pub async fn cancelled(&self) {
            let mut receiver = self.sender.subscribe();
            // The sender lives as long as `self`, so `wait_for` cannot observe a closed channel.
            let _ = receiver.wait_for(|cancelled| *cancelled).await;
        }
    }
}

pub use cancel::CancellationToken;
pub use context::{MetadataMap, SessionId, TraceId};
pub use future::BoxFuture;
pub use model::GenerationOptions;
pub use registry::Registry;
