//! Transcript export.
//!
//! A transcript is a point-in-time JSON snapshot of the configuration, the
//! whole conversation and statistics derived from it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chat::{ChatSession, Message, SessionStats};
use crate::config::Configuration;
use crate::error::{ChatError, Result};
use crate::fs::atomic_write;

/// The exported document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub exported_at: DateTime<Utc>,
    pub model_identifier: String,
    pub configuration: Configuration,
    pub conversation: Vec<Message>,
    pub statistics: SessionStats,
}

impl Transcript {
    /// Snapshots `session` at `exported_at`.
    ///
    /// Fails with [`ChatError::EmptyExport`] when nothing has been said yet.
    pub fn capture(
        session: &ChatSession,
        model_identifier: &str,
        exported_at: DateTime<Utc>,
    ) -> Result<Self> {
        if session.history().is_empty() {
            return Err(ChatError::EmptyExport);
        }

        Ok(Self {
            exported_at,
            model_identifier: model_identifier.to_string(),
            configuration: *session.config(),
            conversation: session.history().to_vec(),
            statistics: session.statistics(),
        })
    }
}

/// Builds the file name for an export made at `at`.
///
/// `:` and `.` are replaced so the name is safe on every filesystem and
/// sorts chronologically.
pub fn transcript_file_name(at: DateTime<Utc>) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("conversation-{stamp}.json")
}

/// Writes transcripts into a directory.
pub struct TranscriptExporter {
    dir: PathBuf,
    model_identifier: String,
}

impl TranscriptExporter {
    pub fn new(dir: impl Into<PathBuf>, model_identifier: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            model_identifier: model_identifier.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Exports the current session and returns the written path.
    ///
    /// Nothing is written if the conversation is empty. An export within the
    /// same millisecond as a previous one overwrites it.
    pub fn export(&self, session: &ChatSession) -> Result<PathBuf> {
        self.export_at(session, Utc::now())
    }

    pub fn export_at(&self, session: &ChatSession, at: DateTime<Utc>) -> Result<PathBuf> {
        let transcript = Transcript::capture(session, &self.model_identifier, at)?;
        let path = self.dir.join(transcript_file_name(at));

        let export_error = |message: String| ChatError::Export {
            path: path.clone(),
            message,
        };

        let contents =
            serde_json::to_string_pretty(&transcript).map_err(|e| export_error(e.to_string()))?;
        std::fs::create_dir_all(&self.dir).map_err(|e| export_error(e.to_string()))?;
        atomic_write(&path, &contents).map_err(|e| export_error(e.to_string()))?;

        debug!(path = %path.display(), messages = transcript.conversation.len(), "exported transcript");
        Ok(path)
    }
}
