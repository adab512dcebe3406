//! Error taxonomy for the chat session.
//!
//! Only model and engine failures at startup are fatal. Everything else is
//! reported to the user at the dispatch boundary and the loop continues.

use std::path::PathBuf;

/// Errors raised by the session, configuration store, exporter and engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Model not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Failed to generate a response: {0}")]
    Generation(String),

    #[error("Invalid configuration in {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("Configuration value out of range: {0}")]
    ConfigInvalid(String),

    #[error("Failed to access configuration file {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No conversation to export")]
    EmptyExport,

    #[error("Failed to export conversation to {}: {message}", path.display())]
    Export { path: PathBuf, message: String },

    #[error("Unknown command: /{0}")]
    UnknownCommand(String),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl ChatError {
    /// Returns `true` if the error must terminate the process.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ModelNotFound(_) | Self::ModelLoad(_))
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
