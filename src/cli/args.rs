use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::chat::DEFAULT_SYSTEM_PROMPT;

pub const DEFAULT_MODEL_PATH: &str = "models/qwen2-1_5b-instruct-q4_k_m.gguf";
pub const DEFAULT_MODEL_NAME: &str = "Qwen2-1.5B-Instruct";

#[derive(Parser, Debug)]
#[command(name = "llama-chat")]
#[command(about = "Chat with a local GGUF model from your terminal")]
#[command(version)]
pub struct Args {
    /// Path to the GGUF model file
    #[arg(short = 'm', long, default_value = DEFAULT_MODEL_PATH)]
    pub model_path: PathBuf,

    /// Model name recorded in exported transcripts
    #[arg(short = 'n', long, default_value = DEFAULT_MODEL_NAME)]
    pub model_name: String,

    /// Attach to a running llama.cpp server instead of spawning one
    #[arg(short = 'e', long)]
    pub endpoint: Option<String>,

    /// llama.cpp server binary to spawn
    #[arg(long, default_value = "llama-server")]
    pub server_bin: PathBuf,

    /// Port for the spawned server
    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// Seconds to wait for the model to load
    #[arg(long, default_value_t = 120)]
    pub startup_timeout: u64,

    /// System prompt for the session
    #[arg(long, default_value = DEFAULT_SYSTEM_PROMPT)]
    pub system_prompt: String,

    /// Directory for exported transcripts
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,

    /// Print replies at once instead of character by character
    #[arg(long)]
    pub no_typewriter: bool,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(ClapArgs, Debug, Clone, Copy)]
pub struct OutputArgs {
    /// Suppress non-essential output
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log debug diagnostics to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect or reset the saved generation configuration
    Config {
        /// Reset the saved configuration to defaults
        #[arg(long, conflicts_with = "path")]
        reset: bool,

        /// Print the location of the configuration file
        #[arg(long)]
        path: bool,
    },
}
