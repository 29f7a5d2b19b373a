use async_trait::async_trait;
use log::{debug, error, info};
use parking_lot::Mutex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};
use url::Url;

use super::{EngineLoader, InferenceEngine, ModelCompletionRequest};
use crate::app_config::RuntimeConfig;
use crate::errors::{ModelError, ProviderError};

/// Interface the child server binds to
const LOOPBACK: &str = "127.0.0.1";

/// Delay between readiness probes while the model loads
const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Completion body for the llama.cpp server `/completion` endpoint
#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    prompt: &'a str,
    temperature: f32,
    top_p: f32,
    /// Maximum number of tokens to generate
    n_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
    stream: bool,
    cache_prompt: bool,
}

/// Completion response from the llama.cpp server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text
    #[serde(default)]
    pub content: String,
    /// Whether generation stopped on its own
    #[serde(default)]
    pub stop: bool,
    /// Number of generated tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_predicted: Option<u64>,
    /// Number of prompt tokens evaluated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_evaluated: Option<u64>,
}

/// A running llama.cpp server holding the model in memory
///
/// The child process is killed when the engine is dropped.
#[derive(Debug)]
pub struct LlamaServerEngine {
    completion_url: Url,
    client: Client,
    child: Mutex<Child>,
}

impl LlamaServerEngine {
    /// Extract the generated text from a server response
    pub fn extract_text(response: &CompletionResponse) -> String {
        response.content.clone()
    }

    /// Report a dead child process as the cause of a failed request
    ///
    /// The engine stays cached after its server exits, so every later request
    /// lands here until the service is restarted.
    fn send_failure(&self, error: reqwest::Error) -> ProviderError {
        let exited = self.child.lock().try_wait().ok().flatten();
        match exited {
            Some(status) => {
                error!("llama-server is no longer running ({}); restart the service", status);
                ProviderError::ConnectionError(format!("llama-server exited ({}): {}", status, error))
            }
            None => error.into(),
        }
    }
}

impl Drop for LlamaServerEngine {
    fn drop(&mut self) {
        if let Some(pid) = self.child.get_mut().id() {
            info!("Stopping llama-server (pid {})", pid);
        }
    }
}

#[async_trait]
impl InferenceEngine for LlamaServerEngine {
    async fn complete(&self, request: &ModelCompletionRequest) -> Result<String, ProviderError> {
        let body = CompletionBody {
            prompt: &request.prompt,
            temperature: request.temperature,
            top_p: request.top_p,
            n_predict: request.max_tokens,
            seed: request.seed,
            stream: false,
            cache_prompt: true,
        };

        let response = match self
            .client
            .post(self.completion_url.clone())
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Err(self.send_failure(e)),
        };

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let response_text = response.text().await?;
        let parsed: CompletionResponse = serde_json::from_str(&response_text)
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        debug!(
            "llama-server completion: {} prompt tokens, {} generated",
            parsed.tokens_evaluated.unwrap_or(0),
            parsed.tokens_predicted.unwrap_or(0)
        );

        Ok(Self::extract_text(&parsed))
    }
}

/// Starts a llama.cpp server for one GGUF model file
#[derive(Debug, Clone)]
pub struct LlamaServerLoader {
    model_path: PathBuf,
    runtime: RuntimeConfig,
}

impl LlamaServerLoader {
    pub fn new(model_path: impl Into<PathBuf>, runtime: RuntimeConfig) -> Self {
        Self {
            model_path: model_path.into(),
            runtime,
        }
    }

    fn command(&self, port: u16) -> Command {
        let threads = self.runtime.threads.unwrap_or_else(default_threads);

        let mut command = Command::new(&self.runtime.binary);
        command
            .arg("--model")
            .arg(&self.model_path)
            .arg("--host")
            .arg(LOOPBACK)
            .arg("--port")
            .arg(port.to_string())
            .arg("--ctx-size")
            .arg(self.runtime.context_size.to_string())
            .arg("--n-gpu-layers")
            .arg(self.runtime.gpu_layers.to_string())
            .arg("--threads")
            .arg(threads.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        command
    }

    fn spawn(&self, port: u16) -> Result<Child, ModelError> {
        self.command(port).spawn().map_err(|e| {
            let reason = match e.kind() {
                io::ErrorKind::NotFound => {
                    format!("'{}' was not found on PATH", self.runtime.binary)
                }
                _ => format!("failed to start '{}': {}", self.runtime.binary, e),
            };
            ModelError::Unavailable(reason)
        })
    }

    /// Poll `/health` until the model is loaded, the child dies, or the deadline passes
    async fn wait_until_ready(
        &self,
        client: &Client,
        health_url: &Url,
        child: &mut Child,
    ) -> Result<(), ModelError> {
        let timeout = Duration::from_secs(self.runtime.startup_timeout_secs);
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(status) = child
                .try_wait()
                .map_err(|e| ModelError::Unavailable(e.to_string()))?
            {
                return Err(ModelError::Unavailable(format!(
                    "llama-server exited during startup ({})",
                    status
                )));
            }

            match client.get(health_url.clone()).send().await {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => debug!("llama-server still loading ({})", response.status()),
                Err(e) => debug!("llama-server not reachable yet: {}", e),
            }

            if Instant::now() >= deadline {
                return Err(ModelError::Unavailable(format!(
                    "llama-server did not become ready within {}s",
                    timeout.as_secs()
                )));
            }

            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl EngineLoader for LlamaServerLoader {
    async fn load(&self) -> Result<Arc<dyn InferenceEngine>, ModelError> {
        if !tokio::fs::try_exists(&self.model_path).await.unwrap_or(false) {
            return Err(ModelError::NotFound(self.model_path.clone()));
        }

        let port = free_port()
            .map_err(|e| ModelError::Unavailable(format!("no free loopback port: {}", e)))?;
        let base_url = Url::parse(&format!("http://{}:{}/", LOOPBACK, port))
            .map_err(|e| ModelError::Unavailable(e.to_string()))?;
        let health_url = base_url
            .join("health")
            .map_err(|e| ModelError::Unavailable(e.to_string()))?;
        let completion_url = base_url
            .join("completion")
            .map_err(|e| ModelError::Unavailable(e.to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(self.runtime.request_timeout_secs))
            .build()
            .map_err(|e| ModelError::Unavailable(format!("failed to build HTTP client: {}", e)))?;

        info!(
            "Starting llama-server for {:?} on {}",
            self.model_path, base_url
        );
        let mut child = self.spawn(port)?;

        if let Err(e) = self.wait_until_ready(&client, &health_url, &mut child).await {
            error!("llama-server failed to start: {}", e);
            return Err(e);
        }

        info!("Model loaded: {:?}", self.model_path);

        Ok(Arc::new(LlamaServerEngine {
            completion_url,
            client,
            child: Mutex::new(child),
        }))
    }
}

/// Ask the OS for an unused loopback port
fn free_port() -> io::Result<u16> {
    let listener = std::net::TcpListener::bind((LOOPBACK, 0))?;
    Ok(listener.local_addr()?.port())
}

/// Half the available cores, at least one
fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| (n.get() / 2).max(1))
        .unwrap_or(1)
}
