use anyhow::Result;
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;

use crate::app_config::Config;
use crate::errors::TranslationError;
use crate::language_utils::{LANGUAGES, SupportedLanguage};
use crate::model_client::ModelClient;
use crate::providers::llama_server::LlamaServerLoader;
use crate::translation::{
    FakeTranslator, LanguageDetector, ModelTranslator, Orchestrator, TranslationRequest,
    TranslationResult, Translator, UnconfiguredTranslator, WhatlangDetector,
};

// @module: Application controller wiring configuration to the translation backend

/// Health report for the service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub model_loaded: bool,
    pub model_name: Option<String>,
}

/// Main application controller shared by the HTTP server and the CLI
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Translation policy over the selected backend
    orchestrator: Orchestrator,
}

impl Controller {
    /// Create a controller with the backend selected from the configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let translator = Self::select_translator(&config);
        let detector: Arc<dyn LanguageDetector> = Arc::new(WhatlangDetector::new());
        Ok(Self::with_components(config, detector, translator))
    }

    /// Create a controller around explicit components
    pub fn with_components(
        config: Config,
        detector: Arc<dyn LanguageDetector>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            config,
            orchestrator: Orchestrator::new(detector, translator),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Pick the model, the fake stand-in, or the unconfigured placeholder
    fn select_translator(config: &Config) -> Arc<dyn Translator> {
        let allow_fake = config.model.allow_fake_translator;

        match config.resolved_model_path() {
            Some(path) if path.exists() => {
                info!("Using local model {:?}", path);
                let loader = LlamaServerLoader::new(path.clone(), config.model.runtime.clone());
                let client = ModelClient::new(Arc::new(loader), config.model.max_concurrency);
                Arc::new(ModelTranslator::new(
                    Arc::new(client),
                    path,
                    config.model.model_name.clone(),
                ))
            }
            Some(path) if allow_fake => {
                warn!("Model file {:?} not found, using the fake translator", path);
                Arc::new(FakeTranslator)
            }
            Some(path) => {
                warn!("Model file {:?} not found", path);
                Arc::new(UnconfiguredTranslator::missing_model(path))
            }
            None if allow_fake => {
                warn!("No model configured, using the fake translator");
                Arc::new(FakeTranslator)
            }
            None => {
                warn!("No model configured; translate requests will fail until one is set");
                Arc::new(UnconfiguredTranslator::not_configured())
            }
        }
    }

    /// Service health
    pub fn health(&self) -> HealthStatus {
        let status = self.orchestrator.translator().model_status();
        HealthStatus {
            status: "ok",
            model_loaded: status.loaded,
            model_name: status.name,
        }
    }

    /// Supported languages in display order
    pub fn languages(&self) -> &'static [SupportedLanguage] {
        LANGUAGES
    }

    /// Translate one already validated request
    pub async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, TranslationError> {
        self.orchestrator.translate(request).await
    }
}
