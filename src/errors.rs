/*!
 * Error types for the locallingua service.
 *
 * Each layer gets its own `thiserror` enum: the inference engine raises
 * `ProviderError`, the model client narrows those into `ModelError`, and the
 * orchestrator surfaces `TranslationError`, which carries a stable wire code.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by an inference engine while executing a completion
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when sending the request to the engine fails
    #[error("Inference request failed: {0}")]
    RequestFailed(String),

    /// Error when the engine response cannot be decoded
    #[error("Failed to parse inference response: {0}")]
    ParseError(String),

    /// Error status returned by the engine itself
    #[error("Inference engine responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the engine
        message: String,
    },

    /// Error establishing or maintaining a connection to the engine
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised by the model client
#[derive(Error, Debug)]
pub enum ModelError {
    /// The configured model file does not exist
    #[error("Model file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The inference runtime could not be started
    #[error("Inference runtime unavailable: {0}")]
    Unavailable(String),

    /// Any other engine failure, passed through unchanged
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Broad failure classes, used to pick the transport status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad caller input; no model call was attempted
    Input,
    /// The model is missing, not configured, or its runtime is absent
    Availability,
    /// The model ran but produced nothing usable
    Output,
    /// Anything else
    Unclassified,
}

/// Errors that can occur while orchestrating a translation
#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("Unsupported source_lang: {0}")]
    UnsupportedSourceLanguage(String),

    #[error("Unsupported target_lang: {0}")]
    UnsupportedTargetLanguage(String),

    #[error("No local model is configured")]
    ModelNotConfigured,

    #[error("Model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("llama.cpp runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("The model returned an empty translation")]
    EmptyModelOutput,

    /// Unclassified engine failure
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl From<ModelError> for TranslationError {
    fn from(error: ModelError) -> Self {
        match error {
            ModelError::NotFound(path) => Self::ModelNotFound(path),
            ModelError::Unavailable(reason) => Self::RuntimeUnavailable(reason),
            ModelError::Provider(inner) => Self::Provider(inner),
        }
    }
}

impl TranslationError {
    /// Stable machine-readable code reported to callers
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedSourceLanguage(_) => "UNSUPPORTED_SOURCE_LANG",
            Self::UnsupportedTargetLanguage(_) => "UNSUPPORTED_TARGET_LANG",
            Self::ModelNotConfigured => "MODEL_NOT_CONFIGURED",
            Self::ModelNotFound(_) => "MODEL_NOT_FOUND",
            Self::RuntimeUnavailable(_) => "LLAMA_CPP_NOT_INSTALLED",
            Self::EmptyModelOutput => "MODEL_EMPTY_OUTPUT",
            Self::Provider(_) => "UNKNOWN",
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::UnsupportedSourceLanguage(_) | Self::UnsupportedTargetLanguage(_) => {
                ErrorClass::Input
            }
            Self::ModelNotConfigured | Self::ModelNotFound(_) | Self::RuntimeUnavailable(_) => {
                ErrorClass::Availability
            }
            Self::EmptyModelOutput => ErrorClass::Output,
            Self::Provider(_) => ErrorClass::Unclassified,
        }
    }

    /// Message safe to show to callers: no filesystem paths, no engine detail
    pub fn public_message(&self) -> String {
        match self {
            Self::UnsupportedSourceLanguage(code) => format!("Unsupported source_lang: {}", code),
            Self::UnsupportedTargetLanguage(code) => format!("Unsupported target_lang: {}", code),
            Self::ModelNotConfigured => "No local model is configured. Set LOCALLINGUA_MODEL_PATH \
                (or enable LOCALLINGUA_ALLOW_FAKE_TRANSLATOR=1)."
                .to_string(),
            Self::ModelNotFound(_) => {
                "The configured model file was not found. Check LOCALLINGUA_MODEL_PATH.".to_string()
            }
            Self::RuntimeUnavailable(_) => "The llama.cpp runtime is not available. Install \
                llama.cpp and make sure llama-server is on PATH."
                .to_string(),
            Self::EmptyModelOutput => "The model returned an empty translation. Try a different \
                text or model quantization."
                .to_string(),
            Self::Provider(_) => "Unexpected error".to_string(),
        }
    }
}

/// A request field that failed boundary validation
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
