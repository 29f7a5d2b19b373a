/*!
 * Request, option and result types for a single translation.
 *
 * All of these are request-scoped values: built once at the boundary,
 * validated there, and never mutated afterwards.
 */

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::language_utils::AUTO;

/// Maximum accepted input length, in characters
pub const MAX_TEXT_CHARS: usize = 10_000;

/// Strategy requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    /// Literal first, natural retry when the literal pass had no effect
    #[default]
    Smart,
    Literal,
    Natural,
}

/// Prompting style actually sent to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    Literal,
    Natural,
}

impl PromptMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::Natural => "natural",
        }
    }
}

impl std::fmt::Display for PromptMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sampling options forwarded to the model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TranslationOptions {
    #[serde(default)]
    pub mode: TranslationMode,

    /// Sampling temperature, 0.0 to 2.0
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling, 0.0 to 1.0
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Completion length cap, 1 to 2048
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling seed; `None` lets the engine pick
    #[serde(default = "default_seed")]
    pub seed: Option<i64>,
}

fn default_temperature() -> f32 {
    0.0
}

fn default_top_p() -> f32 {
    1.0
}

fn default_max_tokens() -> u32 {
    512
}

fn default_seed() -> Option<i64> {
    Some(42)
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            mode: TranslationMode::default(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
            seed: default_seed(),
        }
    }
}

impl TranslationOptions {
    /// Check every numeric field against its documented bounds
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::new("temperature", "must be between 0 and 2"));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(ValidationError::new("top_p", "must be between 0 and 1"));
        }
        if !(1..=2048).contains(&self.max_tokens) {
            return Err(ValidationError::new("max_tokens", "must be between 1 and 2048"));
        }
        Ok(())
    }
}

/// A translation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,

    /// Source language code, or `"auto"`
    #[serde(default = "default_source_lang")]
    pub source_lang: String,

    pub target_lang: String,

    #[serde(default)]
    pub options: TranslationOptions,
}

fn default_source_lang() -> String {
    AUTO.to_string()
}

impl TranslationRequest {
    /// Create a request with default options
    pub fn new(
        text: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            options: TranslationOptions::default(),
        }
    }

    /// Set the requested mode
    pub fn with_mode(mut self, mode: TranslationMode) -> Self {
        self.options.mode = mode;
        self
    }

    /// Replace all options
    pub fn with_options(mut self, options: TranslationOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate text length and option ranges
    ///
    /// Language codes are not checked here; the orchestrator owns that so it
    /// can report which side failed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let chars = self.text.chars().count();
        if chars == 0 {
            return Err(ValidationError::new("text", "must not be empty"));
        }
        if chars > MAX_TEXT_CHARS {
            return Err(ValidationError::new(
                "text",
                format!("must be at most {} characters", MAX_TEXT_CHARS),
            ));
        }
        self.options.validate()
    }
}

/// Outcome of a successful translation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationResult {
    pub translated_text: String,

    /// Code reported by auto-detection, trusted or not
    pub detected_source_lang: Option<String>,

    pub detection_confidence: Option<f64>,

    /// Prompt mode whose output was kept
    pub used_mode: PromptMode,

    /// Wall-clock time spent translating, in milliseconds
    pub latency_ms: u64,
}
