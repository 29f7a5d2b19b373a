/*!
 * Source language detection.
 *
 * Detection is best-effort: a detector never fails, it reports "no detection"
 * instead. Trust decisions (confidence thresholds, registry membership) are
 * made by the orchestrator, not here.
 */

use async_trait::async_trait;
use log::trace;
use whatlang::Detector;

use crate::language_utils::normalize_to_part1;

/// Best guess at the language of a text
///
/// `Detection::none()` (no code, no confidence) is distinct from a detection
/// with zero confidence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Detection {
    pub code: Option<String>,
    pub confidence: Option<f64>,
}

impl Detection {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(code: impl Into<String>, confidence: f64) -> Self {
        Self {
            code: Some(code.into()),
            confidence: Some(confidence),
        }
    }

    pub fn is_none(&self) -> bool {
        self.code.is_none() && self.confidence.is_none()
    }
}

/// Language identification capability
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    async fn detect(&self, text: &str) -> Detection;
}

/// Trigram detector backed by whatlang
pub struct WhatlangDetector {
    detector: Detector,
}

impl WhatlangDetector {
    pub fn new() -> Self {
        Self {
            detector: Detector::new(),
        }
    }

    /// Synchronous detection, mapped onto ISO 639-1 where possible
    pub fn detect_sync(&self, text: &str) -> Detection {
        if text.trim().is_empty() {
            return Detection::none();
        }

        let Some(info) = self.detector.detect(text) else {
            return Detection::none();
        };

        let raw_code = info.lang().code();
        let code = normalize_to_part1(raw_code).unwrap_or_else(|| raw_code.to_string());
        trace!("whatlang: {} -> {} ({:.2})", raw_code, code, info.confidence());

        Detection::new(code, info.confidence())
    }
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageDetector for WhatlangDetector {
    async fn detect(&self, text: &str) -> Detection {
        self.detect_sync(text)
    }
}
