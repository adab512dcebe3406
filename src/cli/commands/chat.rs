use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Result, anyhow};

use crate::chat::{ChatSession, Dispatcher, repl, ui};
use crate::config::{ConfigManager, Configuration};
use crate::engine::{EngineOptions, LlamaServerEngine, ResourceParams};
use crate::error::ChatError;
use crate::export::TranscriptExporter;
use crate::output;
use crate::ui::{Spinner, Style, Typewriter};

pub struct ChatOptions {
    pub model_path: PathBuf,
    pub model_name: String,
    pub engine: EngineOptions,
    pub system_prompt: String,
    pub export_dir: PathBuf,
    pub typewriter: Typewriter,
}

/// Loads the model and runs the interactive session until the user leaves.
///
/// Fails only if the model cannot be loaded or input cannot be read. An
/// interrupt at any point, including while the model loads, is a clean exit.
pub async fn run_chat(options: ChatOptions) -> Result<()> {
    let store = ConfigManager::new();
    let config = startup_config(&store);
    let interactive = std::io::stdin().is_terminal() && std::io::stdout().is_terminal();
    let decorate = interactive && !output::is_quiet();

    crate::status!("Loading model...");
    crate::status!(
        "{} {}",
        Style::label("Model path:"),
        Style::value(options.model_path.display())
    );

    let spinner = if decorate {
        Spinner::new("Waiting for the inference server...")
    } else {
        Spinner::hidden()
    };
    // Dropping the pending load on interrupt also kills a spawned server.
    let engine = tokio::select! {
        engine = LlamaServerEngine::initialize(
            &options.model_path,
            &options.engine,
            ResourceParams::from(&config),
        ) => engine.map_err(startup_error)?,
        _ = tokio::signal::ctrl_c() => {
            spinner.stop();
            println!();
            ui::print_goodbye();
            return Ok(());
        }
    };
    spinner.stop();

    crate::status!(
        "{} Model loaded successfully ({})",
        Style::success("✓"),
        Style::secondary(engine.endpoint())
    );

    let mut session = ChatSession::new(Box::new(engine), config)
        .with_system_prompt(options.system_prompt)
        .with_typewriter(options.typewriter);
    let dispatcher = Dispatcher::new(
        store,
        TranscriptExporter::new(options.export_dir, options.model_name.clone()),
    )
    .with_spinner(decorate);
    let mut reader = if interactive {
        repl::LineReader::interactive()
    } else {
        repl::LineReader::piped()
    };

    ui::print_header(&options.model_name);
    repl::run(&mut session, &dispatcher, &mut reader).await
}

/// Merges the saved configuration over the defaults.
///
/// A broken file is reported and ignored so the session can still start.
fn startup_config(store: &ConfigManager) -> Configuration {
    let defaults = Configuration::default();

    match store.load() {
        Ok(Some(loaded)) => {
            crate::status!(
                "Configuration loaded from {}",
                Style::value(store.config_path().display())
            );
            defaults.merge(&loaded)
        }
        Ok(None) => {
            crate::status!("{}", Style::secondary("No saved configuration found."));
            defaults
        }
        Err(e) => {
            crate::warn!("{} {e}", Style::warning("Warning:"));
            crate::warn!("Using default configuration.");
            defaults
        }
    }
}

fn startup_error(error: ChatError) -> anyhow::Error {
    match error {
        ChatError::ModelNotFound(path) => anyhow!(
            "Model not found: {}\n\n\
             Download a GGUF model first, or point --model-path at one.",
            path.display()
        ),
        other => anyhow!(
            "{other}\n\n\
             Make sure you have enough RAM and the model file is not corrupted."
        ),
    }
}
