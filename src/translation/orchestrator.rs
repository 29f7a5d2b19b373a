/*!
 * Translation orchestrator.
 *
 * Drives one request through:
 * 1. language validation
 * 2. source resolution (auto-detection with a length-dependent threshold)
 * 3. mode dispatch, including the single smart-mode retry
 * 4. sanitizing and the empty-output check
 * 5. result assembly
 *
 * The two possible translator calls of a smart request run strictly one
 * after the other; the retry decision needs the first result.
 */

use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

use crate::errors::TranslationError;
use crate::language_utils::{AUTO, is_supported};

use super::detection::{Detection, LanguageDetector};
use super::sanitize::sanitize;
use super::translator::{TranslationJob, Translator};
use super::types::{PromptMode, TranslationMode, TranslationRequest, TranslationResult};

/// Inputs up to this many characters (trimmed) count as short
pub const SHORT_TEXT_CHARS: usize = 20;

/// Minimum confidence to trust a detection on short input
pub const SHORT_TEXT_THRESHOLD: f64 = 0.35;

/// Minimum confidence to trust a detection on longer input
pub const LONG_TEXT_THRESHOLD: f64 = 0.70;

/// Confidence a detection needs before it replaces `"auto"`
pub fn detection_threshold(text: &str) -> f64 {
    if text.trim().chars().count() <= SHORT_TEXT_CHARS {
        SHORT_TEXT_THRESHOLD
    } else {
        LONG_TEXT_THRESHOLD
    }
}

fn normalize_for_compare(text: &str) -> String {
    text.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when the output equals the input, ignoring case and whitespace runs
pub fn is_passthrough(source_text: &str, translated_text: &str) -> bool {
    normalize_for_compare(source_text) == normalize_for_compare(translated_text)
}

pub fn has_any_letter(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
}

/// Where the effective source language came from
#[derive(Debug, Clone, PartialEq)]
struct ResolvedSource {
    /// Code used for prompting, or `"auto"`
    effective: String,
    /// Raw detector outcome, present only for auto requests
    detection: Option<Detection>,
}

/// Translation policy over a detector and a translator
pub struct Orchestrator {
    detector: Arc<dyn LanguageDetector>,
    translator: Arc<dyn Translator>,
}

impl Orchestrator {
    pub fn new(detector: Arc<dyn LanguageDetector>, translator: Arc<dyn Translator>) -> Self {
        Self {
            detector,
            translator,
        }
    }

    pub fn translator(&self) -> &Arc<dyn Translator> {
        &self.translator
    }

    /// Translate one request
    pub async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, TranslationError> {
        Self::validate_languages(request)?;
        self.translator.check_ready()?;

        let source = self.resolve_source(request).await;

        let started = Instant::now();
        let (raw, used_mode) = self.dispatch(request, &source.effective).await?;
        let translated_text = sanitize(&raw);
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        if translated_text.trim().is_empty() {
            return Err(TranslationError::EmptyModelOutput);
        }

        debug!(
            "Translated {} chars to {} in {} ms ({} mode)",
            request.text.chars().count(),
            request.target_lang,
            latency_ms,
            used_mode
        );

        let (detected_source_lang, detection_confidence) = match source.detection {
            Some(detection) => (detection.code, detection.confidence),
            None => (None, None),
        };

        Ok(TranslationResult {
            translated_text,
            detected_source_lang,
            detection_confidence,
            used_mode,
            latency_ms,
        })
    }

    fn validate_languages(request: &TranslationRequest) -> Result<(), TranslationError> {
        if request.source_lang != AUTO && !is_supported(&request.source_lang) {
            return Err(TranslationError::UnsupportedSourceLanguage(
                request.source_lang.clone(),
            ));
        }
        if !is_supported(&request.target_lang) {
            return Err(TranslationError::UnsupportedTargetLanguage(
                request.target_lang.clone(),
            ));
        }
        Ok(())
    }

    async fn resolve_source(&self, request: &TranslationRequest) -> ResolvedSource {
        if request.source_lang != AUTO {
            return ResolvedSource {
                effective: request.source_lang.clone(),
                detection: None,
            };
        }

        let detection = self.detector.detect(&request.text).await;
        let threshold = detection_threshold(&request.text);

        let accepted = match (&detection.code, detection.confidence) {
            (Some(code), confidence)
                if is_supported(code) && confidence.unwrap_or(0.0) >= threshold =>
            {
                Some(code.clone())
            }
            _ => None,
        };

        debug!(
            "Detected {:?} ({:?}), threshold {:.2}, trusted: {}",
            detection.code,
            detection.confidence,
            threshold,
            accepted.is_some()
        );

        ResolvedSource {
            effective: accepted.unwrap_or_else(|| AUTO.to_string()),
            detection: Some(detection),
        }
    }

    async fn run(
        &self,
        request: &TranslationRequest,
        source_lang: &str,
        mode: PromptMode,
    ) -> Result<String, TranslationError> {
        self.translator
            .translate(TranslationJob {
                text: &request.text,
                source_lang,
                target_lang: &request.target_lang,
                mode,
                options: &request.options,
            })
            .await
    }

    /// Pick the prompt mode(s) and return the kept output with the mode that produced it
    async fn dispatch(
        &self,
        request: &TranslationRequest,
        source_lang: &str,
    ) -> Result<(String, PromptMode), TranslationError> {
        match request.options.mode {
            TranslationMode::Literal => {
                let text = self.run(request, source_lang, PromptMode::Literal).await?;
                Ok((text, PromptMode::Literal))
            }
            TranslationMode::Natural => {
                let text = self.run(request, source_lang, PromptMode::Natural).await?;
                Ok((text, PromptMode::Natural))
            }
            TranslationMode::Smart => {
                let literal = self.run(request, source_lang, PromptMode::Literal).await?;
                if !Self::should_retry(request, source_lang, &literal) {
                    return Ok((literal, PromptMode::Literal));
                }

                info!("Literal pass left the text unchanged, retrying in natural mode");
                let natural = self.run(request, source_lang, PromptMode::Natural).await?;
                if is_passthrough(&request.text, &natural) {
                    debug!("Natural pass was a passthrough too, keeping literal output");
                    Ok((literal, PromptMode::Literal))
                } else {
                    Ok((natural, PromptMode::Natural))
                }
            }
        }
    }

    /// Smart-mode retry rule: letters present, passthrough output, and source != target
    fn should_retry(request: &TranslationRequest, source_lang: &str, literal: &str) -> bool {
        let same_language = source_lang != AUTO && source_lang == request.target_lang;
        has_any_letter(&request.text) && is_passthrough(&request.text, literal) && !same_language
    }
}
