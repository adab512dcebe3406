use std::io::{self, Write};

use tracing::debug;

use super::command::{Input, SlashCommand};
use super::session::ChatSession;
use super::ui;
use crate::config::ConfigManager;
use crate::error::{ChatError, Result};
use crate::export::TranscriptExporter;
use crate::ui::{Spinner, Style};

/// What the loop should do after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Routes parsed input to the session, configuration store and exporter.
///
/// Each call runs to completion before the caller reads the next line, so
/// commands never interleave with an exchange.
pub struct Dispatcher {
    store: ConfigManager,
    exporter: TranscriptExporter,
    show_spinner: bool,
}

impl Dispatcher {
    pub const fn new(store: ConfigManager, exporter: TranscriptExporter) -> Self {
        Self {
            store,
            exporter,
            show_spinner: false,
        }
    }

    /// Shows a spinner while waiting for the model's reply.
    #[must_use]
    pub const fn with_spinner(mut self, show_spinner: bool) -> Self {
        self.show_spinner = show_spinner;
        self
    }

    pub const fn store(&self) -> &ConfigManager {
        &self.store
    }

    pub const fn exporter(&self) -> &TranscriptExporter {
        &self.exporter
    }

    /// Handles one line of input. Replies are written to `out`.
    pub async fn dispatch<W: Write + ?Sized>(
        &self,
        session: &mut ChatSession,
        input: Input,
        out: &mut W,
    ) -> Result<Flow> {
        match input {
            Input::Empty => Ok(Flow::Continue),
            Input::Text(text) => {
                self.chat(session, &text, out).await?;
                Ok(Flow::Continue)
            }
            Input::Command(command) => self.run_command(session, command),
        }
    }

    async fn chat<W: Write + ?Sized>(
        &self,
        session: &mut ChatSession,
        text: &str,
        out: &mut W,
    ) -> Result<()> {
        let spinner = if self.show_spinner {
            Spinner::new("Thinking...")
        } else {
            Spinner::hidden()
        };
        let mut sink = ReplySink {
            spinner: Some(spinner),
            prefix: format!("{} ", Style::assistant("AI:")),
            inner: out,
        };

        session.submit_prompt(text, None, &mut sink).await?;
        writeln!(sink.inner)?;
        writeln!(sink.inner)?;
        sink.inner.flush()?;
        Ok(())
    }

    fn run_command(&self, session: &mut ChatSession, command: SlashCommand) -> Result<Flow> {
        debug!(?command, "dispatching command");

        match command {
            SlashCommand::Help => ui::print_help(),
            SlashCommand::Config => ui::print_config(session.config()),
            SlashCommand::History => ui::print_history(session.history()),
            SlashCommand::Clear => {
                session.clear_history();
                ui::print_success("Conversation history cleared");
            }
            SlashCommand::Stats => ui::print_stats(&session.statistics()),
            SlashCommand::Export => {
                let path = self.exporter.export(session)?;
                ui::print_exported(&path);
            }
            SlashCommand::Save => {
                self.store.save(session.config())?;
                ui::print_saved_config(self.store.config_path());
            }
            SlashCommand::Load => self.load_config(session)?,
            SlashCommand::Reset => {
                let config = session.reset_config();
                ui::print_success("Configuration reset to defaults");
                ui::print_config(config);
            }
            SlashCommand::Exit => return Ok(Flow::Exit),
            SlashCommand::Unknown(name) => return Err(ChatError::UnknownCommand(name)),
        }

        Ok(Flow::Continue)
    }

    fn load_config(&self, session: &mut ChatSession) -> Result<()> {
        let Some(loaded) = self.store.load()? else {
            println!("{}", Style::secondary("No saved configuration found."));
            return Ok(());
        };

        let config = session.apply_config(&loaded)?;
        ui::print_success(&format!(
            "Configuration loaded from {}",
            Style::value(self.store.config_path().display())
        ));
        ui::print_config(config);
        Ok(())
    }
}

/// Clears the spinner and writes the reply prefix before the first chunk.
struct ReplySink<'a, W: Write + ?Sized> {
    spinner: Option<Spinner>,
    prefix: String,
    inner: &'a mut W,
}

impl<W: Write + ?Sized> Write for ReplySink<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop();
            self.inner.write_all(self.prefix.as_bytes())?;
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_sink_writes_prefix_once() {
        let mut out: Vec<u8> = Vec::new();
        let mut sink = ReplySink {
            spinner: Some(Spinner::hidden()),
            prefix: "AI: ".to_string(),
            inner: &mut out,
        };

        sink.write_all(b"Hel").unwrap();
        sink.write_all(b"lo").unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "AI: Hello");
    }

    #[test]
    fn test_reply_sink_silent_without_writes() {
        let mut out: Vec<u8> = Vec::new();
        let sink = ReplySink {
            spinner: Some(Spinner::hidden()),
            prefix: "AI: ".to_string(),
            inner: &mut out,
        };
        drop(sink);

        assert!(out.is_empty());
    }
}
