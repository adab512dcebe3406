//! Interactive chat with a local model.
//!
//! Provides the session state, the slash-command dispatcher and the REPL
//! that drives them.

/// Slash command parsing and autocomplete.
pub mod command;
mod dispatcher;
mod message;
pub mod repl;
mod session;
pub mod ui;

pub use dispatcher::{Dispatcher, Flow};
pub use message::{ConversationLog, Message, Role, SessionStats};
pub use session::{ChatSession, DEFAULT_SYSTEM_PROMPT};
