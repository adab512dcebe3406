use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::Serialize;
use tokio::process::{Child, Command};
use tokio::time::Instant;
use tracing::{debug, info};

use super::sse_parser::sse_to_text_stream;
use super::{GenerationParams, InferenceEngine, PromptContext, ResourceParams};
use crate::error::{ChatError, Result};

const GGUF_MAGIC: &[u8; 4] = b"GGUF";
const HEALTH_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How to reach (or start) the llama.cpp server.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Attach to a server that is already running instead of spawning one.
    pub endpoint: Option<String>,
    /// Server binary spawned when no endpoint is given.
    pub server_binary: PathBuf,
    /// Port the spawned server listens on.
    pub port: u16,
    /// How long to wait for the model to finish loading.
    pub startup_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            endpoint: None,
            server_binary: PathBuf::from("llama-server"),
            port: 8080,
            startup_timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Cow<'a, str>,
}

/// A model served by a llama.cpp `llama-server` process.
///
/// A spawned server is killed when the engine is dropped.
pub struct LlamaServerEngine {
    client: Client,
    endpoint: String,
    server: Option<Child>,
}

/// Verifies that the model artifact exists and looks like a GGUF file.
pub fn check_model_artifact(model_path: &Path) -> Result<()> {
    if !model_path.is_file() {
        return Err(ChatError::ModelNotFound(model_path.to_path_buf()));
    }

    let mut magic = [0u8; 4];
    File::open(model_path)
        .and_then(|mut file| file.read_exact(&mut magic))
        .map_err(|e| ChatError::ModelLoad(format!("cannot read {}: {e}", model_path.display())))?;

    if &magic != GGUF_MAGIC {
        return Err(ChatError::ModelLoad(format!(
            "{} is not a GGUF model file",
            model_path.display()
        )));
    }

    Ok(())
}

impl LlamaServerEngine {
    /// Loads the model and waits until the server reports it is ready.
    pub async fn initialize(
        model_path: &Path,
        options: &EngineOptions,
        resources: ResourceParams,
    ) -> Result<Self> {
        check_model_artifact(model_path)?;

        let (endpoint, server) = match &options.endpoint {
            Some(endpoint) => {
                debug!(%endpoint, "attaching to running server");
                (endpoint.trim_end_matches('/').to_string(), None)
            }
            None => {
                let child = spawn_server(model_path, options, resources)?;
                (format!("http://127.0.0.1:{}", options.port), Some(child))
            }
        };

        let mut engine = Self {
            client: Client::new(),
            endpoint,
            server,
        };
        engine.wait_until_ready(options.startup_timeout).await?;

        info!(endpoint = %engine.endpoint, "model ready");
        Ok(engine)
    }

    #[cfg(test)]
    fn attached(endpoint: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            server: None,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn wait_until_ready(&mut self, timeout: Duration) -> Result<()> {
        let url = format!("{}/health", self.endpoint);
        let deadline = Instant::now() + timeout;

        loop {
            match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => debug!(status = %response.status(), "server not ready"),
                Err(e) => debug!(error = %e, "server not reachable"),
            }

            if let Some(server) = self.server.as_mut()
                && let Ok(Some(status)) = server.try_wait()
            {
                return Err(ChatError::ModelLoad(format!(
                    "inference server exited during startup ({status})"
                )));
            }

            if Instant::now() >= deadline {
                return Err(ChatError::ModelLoad(format!(
                    "inference server at {} not ready after {}s",
                    self.endpoint,
                    timeout.as_secs()
                )));
            }

            tokio::time::sleep(HEALTH_POLL_INTERVAL).await;
        }
    }
}

fn spawn_server(
    model_path: &Path,
    options: &EngineOptions,
    resources: ResourceParams,
) -> Result<Child> {
    debug!(
        binary = %options.server_binary.display(),
        port = options.port,
        ?resources,
        "spawning inference server"
    );

    Command::new(&options.server_binary)
        .arg("-m")
        .arg(model_path)
        .args(["-c", &resources.context_size.to_string()])
        .args(["-t", &resources.threads.to_string()])
        .args(["-b", &resources.batch_size.to_string()])
        .args(["--host", "127.0.0.1"])
        .args(["--port", &options.port.to_string()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            ChatError::ModelLoad(format!(
                "failed to start {}: {e}",
                options.server_binary.display()
            ))
        })
}

#[async_trait]
impl InferenceEngine for LlamaServerEngine {
    async fn generate(
        &self,
        context: PromptContext<'_>,
        params: GenerationParams,
    ) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.endpoint);

        let request = ChatCompletionRequest {
            messages: context
                .turns()
                .map(|(role, content)| ChatMessage {
                    role,
                    content: Cow::Borrowed(content),
                })
                .collect(),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            stream: true,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Generation(format!("failed to reach {url}: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Generation(format!(
                "server responded with {status}: {body}"
            )));
        }

        let mut stream = std::pin::pin!(sse_to_text_stream(response.bytes_stream()));
        let mut reply = String::new();
        while let Some(chunk) = stream.next().await {
            reply.push_str(&chunk?);
        }

        debug!(chars = reply.chars().count(), "generation finished");
        Ok(reply)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::chat::{Message, Role};
    use crate::config::Configuration;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn params() -> GenerationParams {
        GenerationParams::from(&Configuration::default())
    }

    #[test]
    fn test_check_model_artifact_missing() {
        let err = check_model_artifact(Path::new("/nonexistent/model.gguf")).unwrap_err();
        assert!(matches!(err, ChatError::ModelNotFound(_)));
    }

    #[test]
    fn test_check_model_artifact_bad_magic() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not a model").unwrap();

        let err = check_model_artifact(file.path()).unwrap_err();
        assert!(matches!(err, ChatError::ModelLoad(_)));
    }

    #[test]
    fn test_check_model_artifact_truncated() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"GG").unwrap();

        assert!(check_model_artifact(file.path()).is_err());
    }

    #[test]
    fn test_check_model_artifact_gguf() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"GGUF\x03\x00\x00\x00").unwrap();

        assert!(check_model_artifact(file.path()).is_ok());
    }

    #[tokio::test]
    async fn test_generate_collects_stream() {
        let mut server = mockito::Server::new_async().await;
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"!\"}}]}\n\n",
            "data: [DONE]\n\n",
        );
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"stream":true,"max_tokens":1024}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await;

        let engine = LlamaServerEngine::attached(server.url());
        let messages = vec![Message::new(Role::User, "Hi", 1)];
        let context = PromptContext {
            system_prompt: "Be nice.",
            messages: &messages,
        };

        let reply = engine.generate(context, params()).await.unwrap();

        assert_eq!(reply, "Hello!");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_error_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(503)
            .with_body("loading model")
            .create_async()
            .await;

        let engine = LlamaServerEngine::attached(server.url());
        let messages = vec![Message::new(Role::User, "Hi", 1)];
        let context = PromptContext {
            system_prompt: "",
            messages: &messages,
        };

        let err = engine.generate(context, params()).await.unwrap_err();

        assert!(matches!(err, ChatError::Generation(ref m) if m.contains("503")));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_wait_until_ready() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/health")
            .with_status(200)
            .with_body(r#"{"status":"ok"}"#)
            .create_async()
            .await;

        let mut engine = LlamaServerEngine::attached(server.url());
        engine
            .wait_until_ready(Duration::from_secs(5))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_wait_until_ready_times_out() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/health")
            .with_status(503)
            .expect_at_least(1)
            .create_async()
            .await;

        let mut engine = LlamaServerEngine::attached(server.url());
        let err = engine
            .wait_until_ready(Duration::from_millis(10))
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::ModelLoad(_)));
    }
}
