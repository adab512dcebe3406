//! Server-Sent Events parsing for llama.cpp's streaming chat completions.

use bytes::Bytes;
use futures_util::Stream;
use serde::Deserialize;

use crate::error::{ChatError, Result};

#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: String,
}

/// One decoded SSE line.
#[derive(Debug, PartialEq, Eq)]
enum SseEvent {
    Content(String),
    Failed(String),
    Done,
    Ignored,
}

/// Converts a raw SSE byte stream into a stream of text deltas.
///
/// Lines may be split across network chunks; they are buffered until a
/// newline arrives. The stream ends at `data: [DONE]` or when the body ends.
pub fn sse_to_text_stream(
    byte_stream: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
) -> impl Stream<Item = Result<String>> + Send {
    async_stream::stream! {
        use futures_util::StreamExt;

        let mut byte_stream = std::pin::pin!(byte_stream);
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = match chunk_result {
                Ok(c) => c,
                Err(e) => {
                    yield Err(ChatError::Generation(format!("stream interrupted: {e}")));
                    return;
                }
            };

            buffer.extend_from_slice(&chunk);

            // Decode whole lines only; a chunk may end inside a UTF-8 sequence.
            while let Some(line_end) = buffer.iter().position(|&b| b == b'\n') {
                let raw: Vec<u8> = buffer.drain(..=line_end).collect();
                let line = String::from_utf8_lossy(&raw);

                match parse_sse_line(line.trim()) {
                    SseEvent::Content(content) => yield Ok(content),
                    SseEvent::Failed(message) => {
                        yield Err(ChatError::Generation(message));
                        return;
                    }
                    SseEvent::Done => return,
                    SseEvent::Ignored => {}
                }
            }
        }
    }
}

fn parse_sse_line(line: &str) -> SseEvent {
    let Some(payload) = line.strip_prefix("data:").map(str::trim_start) else {
        return SseEvent::Ignored;
    };

    if payload == "[DONE]" {
        return SseEvent::Done;
    }

    let Ok(response) = serde_json::from_str::<StreamResponse>(payload) else {
        return SseEvent::Ignored;
    };

    if let Some(error) = response.error {
        return SseEvent::Failed(error.message);
    }

    let content: String = response
        .choices
        .into_iter()
        .filter_map(|c| c.delta.content)
        .collect();

    if content.is_empty() {
        SseEvent::Ignored
    } else {
        SseEvent::Content(content)
    }
}
