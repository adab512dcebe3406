//! The read-dispatch loop.

use std::io::{self, Write};

use anyhow::{Context, Result};
use inquire::Text;
use inquire::ui::{Attributes, Color, RenderConfig, StyleSheet, Styled};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

use super::command::{SlashCommandCompleter, parse_input};
use super::dispatcher::{Dispatcher, Flow};
use super::session::ChatSession;
use super::ui;
use crate::error::ChatError;
use crate::ui::is_prompt_cancelled;

/// Where input lines come from.
pub enum LineReader {
    /// Line editing with slash-command completion on a terminal.
    Interactive(RenderConfig<'static>),
    /// Plain lines from a pipe or file.
    Piped(Lines<BufReader<Stdin>>),
}

impl LineReader {
    pub fn interactive() -> Self {
        let prompt_style = Styled::new("❯")
            .with_fg(Color::LightBlue)
            .with_attr(Attributes::BOLD);
        let mut render_config = RenderConfig::default()
            .with_prompt_prefix(prompt_style)
            .with_answered_prompt_prefix(prompt_style);

        render_config.option = StyleSheet::new().with_fg(Color::Grey);
        render_config.selected_option = Some(StyleSheet::new().with_fg(Color::DarkMagenta));

        Self::Interactive(render_config)
    }

    pub fn piped() -> Self {
        Self::Piped(BufReader::new(tokio::io::stdin()).lines())
    }

    /// Returns the next line, or `None` at end of input or on cancellation.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        match self {
            Self::Interactive(render_config) => {
                let render_config = *render_config;
                let answer = tokio::task::spawn_blocking(move || {
                    Text::new("")
                        .with_render_config(render_config)
                        .with_autocomplete(SlashCommandCompleter)
                        .with_help_message("Type a message, /help for commands, Ctrl+C to quit")
                        .prompt()
                })
                .await
                .context("Input reader stopped unexpectedly")?;

                match answer {
                    Ok(line) => Ok(Some(line)),
                    Err(e) if is_prompt_cancelled(&e) => {
                        println!();
                        Ok(None)
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Self::Piped(lines) => lines.next_line().await.context("Failed to read input"),
        }
    }

    /// Leaves raw mode after a prompt was abandoned mid-read.
    ///
    /// The prompt's own thread is still blocked on stdin and will never get
    /// the chance to restore the terminal itself.
    fn release_terminal(&self) {
        if matches!(self, Self::Interactive(_))
            && let Err(e) = crossterm::terminal::disable_raw_mode()
        {
            debug!(error = %e, "failed to restore terminal mode");
        }
    }
}

/// Reads lines until `exit`, end of input, or Ctrl-C.
///
/// Runtime failures are reported and the loop continues. Input failures
/// and a lost model end it with an error.
pub async fn run(
    session: &mut ChatSession,
    dispatcher: &Dispatcher,
    reader: &mut LineReader,
) -> Result<()> {
    loop {
        let flow = tokio::select! {
            flow = step(session, dispatcher, reader) => flow?,
            _ = tokio::signal::ctrl_c() => {
                reader.release_terminal();
                println!();
                Flow::Exit
            }
        };

        if flow == Flow::Exit {
            break;
        }
    }

    ui::print_goodbye();
    Ok(())
}

async fn step(
    session: &mut ChatSession,
    dispatcher: &Dispatcher,
    reader: &mut LineReader,
) -> Result<Flow> {
    let Some(line) = reader.next_line().await? else {
        return Ok(Flow::Exit);
    };

    let mut stdout = io::stdout();
    match dispatcher
        .dispatch(session, parse_input(&line), &mut stdout)
        .await
    {
        Ok(flow) => Ok(flow),
        Err(e) if e.is_fatal() => Err(e.into()),
        Err(e) => {
            let _ = stdout.flush();
            report(&e);
            Ok(Flow::Continue)
        }
    }
}

fn report(error: &ChatError) {
    if matches!(error, ChatError::UnknownCommand(_)) {
        ui::print_error(&format!("{error}. Type /help for available commands."));
    } else {
        ui::print_error(&error.to_string());
    }
}
