use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use llama_chat::chat::ui;
use llama_chat::cli::commands::{chat, config};
use llama_chat::cli::{Args, Command};
use llama_chat::engine::EngineOptions;
use llama_chat::logging;
use llama_chat::output::{self, OutputConfig};
use llama_chat::ui::Typewriter;

fn main() -> ExitCode {
    let args = Args::parse();

    output::init(OutputConfig {
        quiet: args.output.quiet,
        no_color: args.output.no_color || OutputConfig::default().no_color,
    });
    logging::init(args.output.verbose);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            ui::print_error(&format!("Failed to start the async runtime: {e}"));
            return ExitCode::FAILURE;
        }
    };

    // The engine, and with it a spawned server, is dropped inside `run`.
    let result = runtime.block_on(run(args));
    // A prompt abandoned on interrupt keeps its reader thread blocked on
    // stdin; waiting for it would hang the exit.
    runtime.shutdown_background();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Some(Command::Config { reset, path }) => config::run_config(reset, path),
        None => {
            let typewriter = if args.no_typewriter {
                Typewriter::instant()
            } else {
                Typewriter::default()
            };

            let options = chat::ChatOptions {
                model_path: args.model_path,
                model_name: args.model_name,
                engine: EngineOptions {
                    endpoint: args.endpoint,
                    server_binary: args.server_bin,
                    port: args.port,
                    startup_timeout: Duration::from_secs(args.startup_timeout),
                },
                system_prompt: args.system_prompt,
                export_dir: args.export_dir,
                typewriter,
            };
            chat::run_chat(options).await
        }
    }
}
