use std::io::Write;

use tracing::{debug, warn};

use super::message::{ConversationLog, Message, Role, SessionStats};
use crate::config::{Configuration, PartialConfiguration};
use crate::engine::{GenerationParams, InferenceEngine, PromptContext};
use crate::error::Result;
use crate::ui::Typewriter;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful, friendly, and knowledgeable AI assistant. \
     You provide accurate, helpful, and engaging responses to user questions and requests.";

/// The single live conversation of the process.
///
/// Owns the active configuration and the conversation log; both are only
/// mutated through this type.
pub struct ChatSession {
    engine: Box<dyn InferenceEngine>,
    config: Configuration,
    log: ConversationLog,
    turn_counter: u64,
    system_prompt: String,
    typewriter: Typewriter,
}

impl ChatSession {
    /// Creates a session with the default system prompt and typewriter.
    pub fn new(engine: Box<dyn InferenceEngine>, config: Configuration) -> Self {
        Self {
            engine,
            config,
            log: ConversationLog::new(),
            turn_counter: 0,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            typewriter: Typewriter::default(),
        }
    }

    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    #[must_use]
    pub const fn with_typewriter(mut self, typewriter: Typewriter) -> Self {
        self.typewriter = typewriter;
        self
    }

    pub const fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Merges `overrides` into the active configuration.
    ///
    /// The configuration is left untouched if the result would be invalid.
    pub fn apply_config(&mut self, overrides: &PartialConfiguration) -> Result<&Configuration> {
        let merged = self.config.merge(overrides);
        merged.validate()?;
        self.config = merged;
        Ok(&self.config)
    }

    /// Discards every override and returns the defaults now in effect.
    pub fn reset_config(&mut self) -> &Configuration {
        self.config = Configuration::default();
        &self.config
    }

    pub fn history(&self) -> &[Message] {
        self.log.messages()
    }

    /// Empties the log and restarts turn numbering. Configuration is kept.
    pub fn clear_history(&mut self) {
        self.log.clear();
        self.turn_counter = 0;
    }

    pub fn statistics(&self) -> SessionStats {
        self.log.stats()
    }

    /// Runs one exchange with the model.
    ///
    /// The user message is recorded before the engine is called and stays
    /// in the log if generation fails. On success the reply is recorded
    /// under the same turn id and then written to `sink` progressively.
    pub async fn submit_prompt<W: Write + ?Sized>(
        &mut self,
        text: &str,
        overrides: Option<&PartialConfiguration>,
        sink: &mut W,
    ) -> Result<String> {
        debug_assert!(!text.trim().is_empty(), "empty prompts are filtered by callers");

        let effective = overrides.map_or(self.config, |o| self.config.merge(o));
        effective.validate()?;

        self.turn_counter += 1;
        let turn_id = self.turn_counter;
        self.log.push(Message::new(Role::User, text, turn_id));
        debug!(turn_id, ?effective, "submitting prompt");

        let context = PromptContext {
            system_prompt: &self.system_prompt,
            messages: self.log.messages(),
        };
        let reply = match self
            .engine
            .generate(context, GenerationParams::from(&effective))
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(turn_id, error = %e, "generation failed");
                return Err(e);
            }
        };

        self.log
            .push(Message::new(Role::Assistant, reply.clone(), turn_id));
        self.typewriter.emit(&reply, sink).await?;

        Ok(reply)
    }
}
