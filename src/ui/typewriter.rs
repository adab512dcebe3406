//! Progressive presentation of a finished reply.
//!
//! The engine hands back the whole text at once; the typewriter writes it
//! out a few characters at a time and yields to the runtime between chunks,
//! so a pending Ctrl-C is noticed mid-reply.

use std::io::{self, Write};
use std::time::Duration;

/// Delay between chunks used by the interactive console.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Typewriter {
    delay: Duration,
    chunk_chars: usize,
}

impl Typewriter {
    /// `chunk_chars` is clamped to at least one character.
    pub fn new(delay: Duration, chunk_chars: usize) -> Self {
        Self {
            delay,
            chunk_chars: chunk_chars.max(1),
        }
    }

    /// No delay between chunks. Still yields, but never sleeps.
    pub const fn instant() -> Self {
        Self {
            delay: Duration::ZERO,
            chunk_chars: 1,
        }
    }

    /// Writes `text` to `sink` chunk by chunk, flushing after each one.
    pub async fn emit<W: Write + ?Sized>(&self, text: &str, sink: &mut W) -> io::Result<()> {
        let mut chars = text.chars();
        let mut chunk = String::new();

        loop {
            chunk.clear();
            chunk.extend(chars.by_ref().take(self.chunk_chars));
            if chunk.is_empty() {
                break;
            }

            sink.write_all(chunk.as_bytes())?;
            sink.flush()?;

            if self.delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.delay).await;
            }
        }

        Ok(())
    }
}

impl Default for Typewriter {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY, 1)
    }
}
