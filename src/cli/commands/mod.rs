//! Subcommand implementations.

/// Interactive chat session.
pub mod chat;

/// Saved configuration inspection.
pub mod config;
