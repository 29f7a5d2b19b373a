/*!
 * Translator backends driven by the orchestrator.
 *
 * - `ModelTranslator`: prompt builder, model client, sanitizer
 * - `FakeTranslator`: deterministic stand-in when no model is configured
 * - `UnconfiguredTranslator`: reports why no model is available
 */

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;

use crate::errors::TranslationError;
use crate::model_client::ModelClient;
use crate::providers::ModelCompletionRequest;

use super::prompts::build_prompt;
use super::sanitize::sanitize;
use super::types::{PromptMode, TranslationOptions};

/// One translator call
#[derive(Debug, Clone, Copy)]
pub struct TranslationJob<'a> {
    pub text: &'a str,
    /// Effective source code, or `"auto"`
    pub source_lang: &'a str,
    pub target_lang: &'a str,
    pub mode: PromptMode,
    pub options: &'a TranslationOptions,
}

/// What the health endpoint reports about the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStatus {
    pub loaded: bool,
    pub name: Option<String>,
}

/// A capability that turns a job into translated text
#[async_trait]
pub trait Translator: Send + Sync {
    /// Fail fast when the backend cannot serve any request
    fn check_ready(&self) -> Result<(), TranslationError> {
        Ok(())
    }

    fn model_status(&self) -> ModelStatus;

    async fn translate(&self, job: TranslationJob<'_>) -> Result<String, TranslationError>;
}

/// Translator backed by a local model
pub struct ModelTranslator {
    client: Arc<ModelClient>,
    model_path: PathBuf,
    model_name: Option<String>,
}

impl ModelTranslator {
    pub fn new(client: Arc<ModelClient>, model_path: PathBuf, model_name: Option<String>) -> Self {
        Self {
            client,
            model_path,
            model_name,
        }
    }
}

#[async_trait]
impl Translator for ModelTranslator {
    fn model_status(&self) -> ModelStatus {
        let loaded = self.model_path.exists();
        let name = self.model_name.clone().or_else(|| {
            self.model_path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        });
        ModelStatus {
            loaded,
            name: if loaded { name } else { None },
        }
    }

    async fn translate(&self, job: TranslationJob<'_>) -> Result<String, TranslationError> {
        let prompt = build_prompt(job.text, job.source_lang, job.target_lang, job.mode);
        let request = ModelCompletionRequest::new(prompt, job.options);
        let raw = self.client.complete(&request).await?;
        Ok(sanitize(&raw))
    }
}

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Deterministic translator for development without a model
#[derive(Debug, Default, Clone, Copy)]
pub struct FakeTranslator;

impl FakeTranslator {
    pub const NAME: &'static str = "FakeTranslator";
}

#[async_trait]
impl Translator for FakeTranslator {
    fn model_status(&self) -> ModelStatus {
        ModelStatus {
            loaded: true,
            name: Some(Self::NAME.to_string()),
        }
    }

    async fn translate(&self, job: TranslationJob<'_>) -> Result<String, TranslationError> {
        let cleaned = WHITESPACE_RUN.replace_all(job.text, " ");
        Ok(format!(
            "[fake {}->{}] {}",
            job.source_lang,
            job.target_lang,
            cleaned.trim()
        ))
    }
}

/// Placeholder used when no model can be served
#[derive(Debug, Default, Clone)]
pub struct UnconfiguredTranslator {
    /// Configured path that turned out to be missing
    missing_model: Option<PathBuf>,
}

impl UnconfiguredTranslator {
    pub fn not_configured() -> Self {
        Self { missing_model: None }
    }

    pub fn missing_model(path: PathBuf) -> Self {
        Self {
            missing_model: Some(path),
        }
    }
}

#[async_trait]
impl Translator for UnconfiguredTranslator {
    fn check_ready(&self) -> Result<(), TranslationError> {
        match &self.missing_model {
            Some(path) => Err(TranslationError::ModelNotFound(path.clone())),
            None => Err(TranslationError::ModelNotConfigured),
        }
    }

    fn model_status(&self) -> ModelStatus {
        ModelStatus {
            loaded: false,
            name: None,
        }
    }

    async fn translate(&self, _job: TranslationJob<'_>) -> Result<String, TranslationError> {
        self.check_ready()?;
        Err(TranslationError::ModelNotConfigured)
    }
}
