/*!
 * Inference engine seam.
 *
 * The model client only knows these two traits:
 * - `InferenceEngine`: a loaded model that turns a prompt into text
 * - `EngineLoader`: how to bring such an engine up on first use
 *
 * `llama_server` provides the production implementation, a llama.cpp
 * server child process driven over loopback HTTP.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

use crate::errors::{ModelError, ProviderError};
use crate::translation::TranslationOptions;

/// One completion call, passed verbatim to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCompletionRequest {
    pub prompt: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub seed: Option<i64>,
}

impl ModelCompletionRequest {
    /// Build a request from a prompt and the caller's sampling options
    pub fn new(prompt: impl Into<String>, options: &TranslationOptions) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: options.temperature,
            top_p: options.top_p,
            max_tokens: options.max_tokens,
            seed: options.seed,
        }
    }
}

/// A loaded model able to run completions
#[async_trait]
pub trait InferenceEngine: Send + Sync + Debug {
    /// Run one completion and return the raw generated text
    async fn complete(&self, request: &ModelCompletionRequest) -> Result<String, ProviderError>;
}

/// Brings an engine up; called at most until it first succeeds
#[async_trait]
pub trait EngineLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn InferenceEngine>, ModelError>;
}

pub mod llama_server;
