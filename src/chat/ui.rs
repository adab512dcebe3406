//! Chat mode UI components.

use std::fmt::Display;
use std::path::Path;

use chrono::Local;

use super::command::SLASH_COMMANDS;
use super::message::{Message, Role, SessionStats};
use crate::config::Configuration;
use crate::ui::Style;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const HISTORY_PREVIEW_CHARS: usize = 100;
const CONFIG_LABEL_WIDTH: usize = 14;
const STATS_LABEL_WIDTH: usize = 21;
const HELP_COMMAND_WIDTH: usize = 10;

pub fn print_header(model_name: &str) {
    crate::status!(
        "{} {} - {}",
        Style::header("llama-chat"),
        Style::version(format!("v{VERSION}")),
        Style::value(model_name)
    );
    crate::status!(
        "{}",
        Style::hint("Start chatting with your local AI! Type /help for available commands.")
    );
    crate::status!();
}

pub fn print_goodbye() {
    println!("{}", Style::success("Goodbye! Thanks for chatting!"));
}

pub fn print_config(config: &Configuration) {
    println!("{}", Style::header("Current model configuration"));
    let rows = [
        ("context_size", config.context_size.to_string()),
        ("threads", config.threads.to_string()),
        ("batch_size", config.batch_size.to_string()),
        ("max_tokens", config.max_tokens.to_string()),
        ("temperature", config.temperature.to_string()),
        ("top_p", config.top_p.to_string()),
    ];
    for (label, value) in rows {
        println!("{}", row(label, CONFIG_LABEL_WIDTH, value));
    }
    println!();
}

/// One indented key/value line. The label is padded before it is styled so
/// escape codes do not eat into the column width.
fn row(label: &str, width: usize, value: impl Display) -> String {
    format!(
        "  {}{}",
        Style::label(format!("{label:<width$}")),
        Style::value(value)
    )
}

pub fn print_help() {
    println!("{}", Style::header("Available commands"));
    for (command, description) in SLASH_COMMANDS {
        println!(
            "  {}{}",
            Style::command(format!("{command:<HELP_COMMAND_WIDTH$}")),
            Style::secondary(description)
        );
    }
    println!();
}

/// Cuts `content` to the preview length, marking the cut with `...`.
pub fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(HISTORY_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

pub fn print_history(messages: &[Message]) {
    if messages.is_empty() {
        println!("{}", Style::secondary("No conversation history yet."));
        return;
    }

    println!("{}", Style::header("Conversation history"));
    for message in messages {
        let time = message.timestamp.with_timezone(&Local).format("%H:%M:%S");
        let role = match message.role {
            Role::User => Style::user("You"),
            Role::Assistant => Style::assistant("AI"),
        };
        println!(
            "[{}] {role}: {}",
            Style::secondary(time),
            preview(&message.content)
        );
    }
    println!();
}

pub fn print_stats(stats: &SessionStats) {
    println!("{}", Style::header("Conversation statistics"));
    let rows = [
        ("Total turns", stats.total_turns),
        ("User messages", stats.user_messages),
        ("AI messages", stats.assistant_messages),
        ("Conversation length", stats.conversation_length),
    ];
    for (label, value) in rows {
        println!("{}", row(label, STATS_LABEL_WIDTH, value));
    }
    println!();
}

pub fn print_success(message: &str) {
    println!("{} {message}", Style::success("✓"));
}

pub fn print_saved_config(path: &Path) {
    print_success(&format!(
        "Configuration saved to {}",
        Style::value(path.display())
    ));
}

pub fn print_exported(path: &Path) {
    print_success(&format!(
        "Conversation exported to {}",
        Style::value(path.display())
    ));
}

pub fn print_error(message: &str) {
    eprintln!("{} {message}", Style::error("Error:"));
    eprintln!();
}
