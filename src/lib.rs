//! # llama-chat - Terminal chat for local GGUF models
//!
//! `llama-chat` loads a quantized model through a llama.cpp server and
//! runs an interactive conversation in the terminal. Generation settings
//! can be tuned, persisted and restored, and conversations can be exported
//! as JSON transcripts.
//!
//! ## Quick Start
//!
//! ```bash
//! # Chat with the default model
//! llama-chat
//!
//! # Use another model file
//! llama-chat --model-path ./models/phi-3-mini.gguf --model-name Phi-3-mini
//!
//! # Reuse a server that is already running
//! llama-chat --endpoint http://127.0.0.1:8080
//!
//! # Inspect the saved configuration
//! llama-chat config
//! ```
//!
//! ## Configuration
//!
//! Settings are stored in `~/.config/llama-chat/config.toml`:
//!
//! ```toml
//! context_size = 2048
//! threads = 4
//! batch_size = 512
//! max_tokens = 1024
//! temperature = 0.7
//! top_p = 0.9
//! ```

/// Interactive chat session, slash commands and REPL.
pub mod chat;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Generation configuration and its persistence.
pub mod config;

/// Inference engine abstraction and the llama.cpp server backend.
pub mod engine;

/// Error types shared across the crate.
pub mod error;

/// Conversation transcript export.
pub mod export;

/// File system utilities.
pub mod fs;

/// Diagnostic logging setup.
pub mod logging;

/// Global output configuration (quiet mode, colors, stderr/stdout routing).
pub mod output;

/// XDG-style path utilities for configuration.
pub mod paths;

/// Terminal UI components (spinner, colors, typewriter).
pub mod ui;
