//! The inference engine seam.
//!
//! The session only needs "submit context, receive completion text". The
//! concrete engine talks to a llama.cpp server over its OpenAI-compatible
//! HTTP API.

mod llama_server;
mod sse_parser;

use async_trait::async_trait;

use crate::chat::{Message, Role};
use crate::config::Configuration;
use crate::error::Result;

pub use llama_server::{EngineOptions, LlamaServerEngine, check_model_artifact};

/// Resource footprint the engine is started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceParams {
    pub context_size: u32,
    pub threads: u32,
    pub batch_size: u32,
}

impl From<&Configuration> for ResourceParams {
    fn from(config: &Configuration) -> Self {
        Self {
            context_size: config.context_size,
            threads: config.threads,
            batch_size: config.batch_size,
        }
    }
}

/// Sampling parameters for one generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

impl From<&Configuration> for GenerationParams {
    fn from(config: &Configuration) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }
}

/// Everything the model sees for one generation call.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub system_prompt: &'a str,
    pub messages: &'a [Message],
}

impl PromptContext<'_> {
    /// Flattens the context into `(role, content)` pairs, system prompt first.
    pub fn turns(&self) -> impl Iterator<Item = (&'static str, &str)> {
        let system = (!self.system_prompt.is_empty()).then_some(("system", self.system_prompt));
        system.into_iter().chain(
            self.messages
                .iter()
                .map(|m| (m.role.as_str(), m.content.as_str())),
        )
    }

    /// Returns the most recent user prompt, if any.
    pub fn last_user_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// A loaded model that can produce completions.
///
/// Calls may take arbitrarily long; callers impose no timeout.
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Generates the complete assistant reply for `context`.
    ///
    /// Any failure is reported as [`crate::error::ChatError::Generation`].
    async fn generate(
        &self,
        context: PromptContext<'_>,
        params: GenerationParams,
    ) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turns_start_with_system_prompt() {
        let messages = vec![
            Message::new(Role::User, "Hi", 1),
            Message::new(Role::Assistant, "Hello!", 1),
        ];
        let context = PromptContext {
            system_prompt: "Be brief.",
            messages: &messages,
        };

        let turns: Vec<_> = context.turns().collect();
        assert_eq!(
            turns,
            [
                ("system", "Be brief."),
                ("user", "Hi"),
                ("assistant", "Hello!")
            ]
        );
    }

    #[test]
    fn test_turns_skip_empty_system_prompt() {
        let messages = vec![Message::new(Role::User, "Hi", 1)];
        let context = PromptContext {
            system_prompt: "",
            messages: &messages,
        };

        assert_eq!(context.turns().count(), 1);
    }

    #[test]
    fn test_last_user_prompt() {
        let messages = vec![
            Message::new(Role::User, "first", 1),
            Message::new(Role::Assistant, "reply", 1),
            Message::new(Role::User, "second", 2),
        ];
        let context = PromptContext {
            system_prompt: "",
            messages: &messages,
        };

        assert_eq!(context.last_user_prompt(), Some("second"));
    }

    #[test]
    fn test_params_from_configuration() {
        let config = Configuration::default();

        let resources = ResourceParams::from(&config);
        assert_eq!(resources.context_size, 2048);
        assert_eq!(resources.threads, 4);
        assert_eq!(resources.batch_size, 512);

        let params = GenerationParams::from(&config);
        assert_eq!(params.max_tokens, 1024);
    }
}
