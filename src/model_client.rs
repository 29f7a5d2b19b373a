/*!
 * Model client: one shared engine behind a concurrency gate.
 *
 * The engine is loaded on first use and kept for the lifetime of the client.
 * Concurrent first callers race safely: exactly one load runs, and a failed
 * load leaves the slot empty so a later call can retry it.
 */

use log::{debug, error, info};
use std::sync::Arc;
use tokio::sync::{OnceCell, Semaphore};

use crate::errors::ModelError;
use crate::providers::{EngineLoader, InferenceEngine, ModelCompletionRequest};

/// Bounded, lazily loaded access to an inference engine
pub struct ModelClient {
    loader: Arc<dyn EngineLoader>,
    engine: OnceCell<Arc<dyn InferenceEngine>>,
    gate: Semaphore,
    max_concurrency: usize,
}

impl ModelClient {
    /// Create a client allowing at most `max_concurrency` completions in flight (minimum 1)
    pub fn new(loader: Arc<dyn EngineLoader>, max_concurrency: usize) -> Self {
        let max_concurrency = max_concurrency.max(1);
        Self {
            loader,
            engine: OnceCell::new(),
            gate: Semaphore::new(max_concurrency),
            max_concurrency,
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Whether the engine has been loaded yet
    pub fn is_loaded(&self) -> bool {
        self.engine.initialized()
    }

    /// Run one completion, waiting for a free slot first
    ///
    /// The slot is released when this call returns, whatever the outcome.
    pub async fn complete(&self, request: &ModelCompletionRequest) -> Result<String, ModelError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| ModelError::Unavailable("model client is shut down".to_string()))?;

        let engine = self.engine().await?;
        debug!(
            "Running completion ({} prompt chars, max {} tokens)",
            request.prompt.chars().count(),
            request.max_tokens
        );

        Ok(engine.complete(request).await?)
    }

    async fn engine(&self) -> Result<&Arc<dyn InferenceEngine>, ModelError> {
        self.engine
            .get_or_try_init(|| async {
                info!("Loading inference engine");
                self.loader.load().await.inspect_err(|e| {
                    error!("Failed to load inference engine: {}", e);
                })
            })
            .await
    }
}
