//! Conversation-level configuration.

use lcommon::GenerationOptions;

use crate::ChatError;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant with access to tools. \
Use them when they help you give an accurate answer.";

pub const DEFAULT_MAX_ROUNDS: u32 = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct ChatPolicy {
    pub model: String,
    pub system_prompt: String,
    /// Completion rounds allowed per turn. `None` never stops a turn that keeps requesting calls.
    pub max_rounds: Option<u32>,
    pub options: GenerationOptions,
}

impl ChatPolicy {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_rounds: Some(DEFAULT_MAX_ROUNDS),
            options: GenerationOptions::default(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.max_rounds = None;
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn validate(&self) -> Result<(), ChatError> {
        if self.model.trim().is_empty() {
            return Err(ChatError::invalid_request("model must not be empty"));
        }

        if self.max_rounds == Some(0) {
            return Err(ChatError::invalid_request(
                "max_rounds must be greater than zero",
            ));
        }

        if self.options.max_tokens == Some(0) {
            return Err(ChatError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        if let Some(temperature) = self.options.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ChatError::invalid_request(
                "temperature must be in the inclusive range 0.0..=2.0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_bounded_and_valid() {
        let policy = ChatPolicy::new("gpt-4o-mini");

        assert_eq!(policy.max_rounds, Some(DEFAULT_MAX_ROUNDS));
        assert!(policy.validate().is_ok());
        assert!(policy.unbounded().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(ChatPolicy::new(" ").validate().is_err());
        assert!(ChatPolicy::new("m").with_max_rounds(0).validate().is_err());
        assert!(
            ChatPolicy::new("m")
                .with_options(GenerationOptions::default().with_temperature(3.0))
                .validate()
                .is_err()
        );
    }
}
