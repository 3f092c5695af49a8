//! Folding streamed fragments into one candidate assistant message.
//!
//! ```rust
//! use lprovider::{CapabilityCallFragment, Fragment, StreamAccumulator};
//!
//! let mut accumulator = StreamAccumulator::new();
//! accumulator.push(&Fragment::call(
//!     CapabilityCallFragment::new(0).with_id("call_1").with_name("read_file"),
//! ));
//! accumulator.push(&Fragment::call(
//!     CapabilityCallFragment::new(0).with_arguments_delta(r#"{"path":"#),
//! ));
//! accumulator.push(&Fragment::call(
//!     CapabilityCallFragment::new(0).with_arguments_delta(r#""x.txt"}"#),
//! ));
//!
//! let message = accumulator.finish();
//! assert_eq!(message.capability_calls[0].arguments, r#"{"path":"x.txt"}"#);
//! ```

use std::collections::BTreeMap;

use crate::{AssistantMessage, CapabilityCall, CapabilityCallFragment, Fragment};

#[derive(Debug, Default)]
struct PartialCall {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

#[derive(Debug, Default)]
pub struct StreamAccumulator {
    text: String,
    calls: BTreeMap<u32, PartialCall>,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: &Fragment) {
        match fragment {
            Fragment::TextDelta(delta) => self.text.push_str(delta),
            Fragment::CapabilityCallDelta(call) => self.merge_call(call),
        }
    }

    fn merge_call(&mut self, fragment: &CapabilityCallFragment) {
        let entry = self.calls.entry(fragment.index).or_default();

        // First non-empty id and name win; providers repeat or blank them on later chunks.
        if entry.id.is_none()
            && let Some(id) = fragment.id.as_deref().filter(|id| !id.is_empty())
        {
            entry.id = Some(id.to_string());
        }

        if entry.name.is_none()
            && let Some(name) = fragment.name.as_deref().filter(|name| !name.is_empty())
        {
            entry.name = Some(name.to_string());
        }

        if let Some(delta) = &fragment.arguments_delta {
            entry.arguments.push_str(delta);
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn pending_calls(&self) -> usize {
        self.calls.len()
    }

    /// Completes accumulation. Calls are ordered by fragment index; a call that never received a
    /// name cannot be dispatched and is dropped.
    pub fn finish(self) -> AssistantMessage {
        let mut capability_calls = Vec::with_capacity(self.calls.len());

        for (index, call) in self.calls {
            let Some(name) = call.name else {
                tracing::warn!(
                    phase = "stream",
                    event = "call_without_name",
                    index,
                    arguments_len = call.arguments.len()
                );
                continue;
            };

            capability_calls.push(CapabilityCall {
                id: call.id.unwrap_or_else(|| format!("call_{index}")),
                name,
                arguments: call.arguments,
            });
        }

        AssistantMessage::new(self.text, capability_calls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(index: u32) -> CapabilityCallFragment {
        CapabilityCallFragment::new(index)
    }

    #[test]
    fn text_deltas_concatenate() {
        let mut accumulator = StreamAccumulator::new();
        accumulator.push(&Fragment::text("hel"));
        accumulator.push(&Fragment::text("lo"));

        assert_eq!(accumulator.text(), "hello");
        let message = accumulator.finish();
        assert_eq!(message.content, "hello");
        assert!(!message.has_capability_calls());
    }

    #[test]
    fn interleaved_calls_merge_by_index_and_sort() {
        let mut accumulator = StreamAccumulator::new();
        accumulator.push(&Fragment::call(call(1).with_id("b").with_name("delete")));
        accumulator.push(&Fragment::call(call(0).with_id("a").with_name("rename")));
        accumulator.push(&Fragment::call(call(1).with_arguments_delta("{\"path\":")));
        accumulator.push(&Fragment::call(call(0).with_arguments_delta("{}")));
        accumulator.push(&Fragment::call(call(1).with_arguments_delta("\"b\"}")));
        assert_eq!(accumulator.pending_calls(), 2);

        let message = accumulator.finish();
        assert_eq!(message.capability_calls.len(), 2);
        assert_eq!(message.capability_calls[0], CapabilityCall::new("a", "rename", "{}"));
        assert_eq!(
            message.capability_calls[1],
            CapabilityCall::new("b", "delete", "{\"path\":\"b\"}")
        );
    }

    #[test]
    fn first_id_and_name_win_and_blank_repeats_are_ignored() {
        let mut accumulator = StreamAccumulator::new();
        accumulator.push(&Fragment::call(call(0).with_id("call_x").with_name("run_cmd")));
        accumulator.push(&Fragment::call(call(0).with_id("").with_name("")));
        accumulator.push(&Fragment::call(call(0).with_id("other").with_name("other")));

        let message = accumulator.finish();
        assert_eq!(message.capability_calls[0].id, "call_x");
        assert_eq!(message.capability_calls[0].name, "run_cmd");
    }

    #[test]
    fn missing_id_is_synthesized_and_nameless_calls_are_dropped() {
        let mut accumulator = StreamAccumulator::new();
        accumulator.push(&Fragment::call(call(0).with_name("list_dir")));
        accumulator.push(&Fragment::call(call(3).with_arguments_delta("{}")));

        let message = accumulator.finish();
        assert_eq!(message.capability_calls.len(), 1);
        assert_eq!(message.capability_calls[0].id, "call_0");
        assert_eq!(message.capability_calls[0].arguments, "");
    }

    #[test]
    fn empty_stream_yields_empty_message() {
        assert!(StreamAccumulator::new().finish().is_empty());
    }
}
