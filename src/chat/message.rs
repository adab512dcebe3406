use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Shared by a user prompt and the reply it produced.
    pub turn_id: u64,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, turn_id: u64) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            turn_id,
        }
    }
}

/// Counts derived from the conversation log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Number of distinct turns, answered or not.
    pub total_turns: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub conversation_length: usize,
}

/// Append-only, insertion-ordered record of exchanged messages.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Appends a message. Turn ids never decrease along the log.
    pub fn push(&mut self, message: Message) {
        debug_assert!(
            self.messages
                .last()
                .is_none_or(|last| last.turn_id <= message.turn_id),
            "turn ids must be non-decreasing"
        );
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn stats(&self) -> SessionStats {
        let count = |role| self.messages.iter().filter(|m| m.role == role).count();
        let turns: HashSet<u64> = self.messages.iter().map(|m| m.turn_id).collect();

        SessionStats {
            total_turns: turns.len(),
            user_messages: count(Role::User),
            assistant_messages: count(Role::Assistant),
            conversation_length: self.messages.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_log_stats() {
        let log = ConversationLog::new();
        assert!(log.messages().is_empty());
        assert_eq!(log.stats(), SessionStats::default());
    }

    #[test]
    fn test_stats_count_roles_independently() {
        let mut log = ConversationLog::new();
        log.push(Message::new(Role::User, "Hi", 1));
        log.push(Message::new(Role::Assistant, "Hello!", 1));
        log.push(Message::new(Role::User, "Are you there?", 2));

        let stats = log.stats();
        assert_eq!(stats.total_turns, 2);
        assert_eq!(stats.user_messages, 2);
        assert_eq!(stats.assistant_messages, 1);
        assert_eq!(stats.conversation_length, 3);
    }

    #[test]
    fn test_clear_empties_log() {
        let mut log = ConversationLog::new();
        log.push(Message::new(Role::User, "Hi", 1));
        log.clear();

        assert!(log.messages().is_empty());
        assert_eq!(log.stats().total_turns, 0);
    }

    #[test]
    fn test_message_serializes_lowercase_role() {
        let message = Message::new(Role::Assistant, "Hello!", 3);
        let json = serde_json::to_value(&message).unwrap_or_default();

        assert_eq!(json["role"], "assistant");
        assert_eq!(json["turn_id"], 3);
        assert_eq!(json["content"], "Hello!");
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut log = ConversationLog::new();
        log.push(Message::new(Role::User, "first", 1));
        log.push(Message::new(Role::Assistant, "second", 1));

        let contents: Vec<&str> = log.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second"]);
    }
}
