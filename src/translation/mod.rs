/*!
 * Translation engine.
 *
 * - `types`: request, options and result values
 * - `prompts`: prompt templates and the prompt builder
 * - `sanitize`: cleanup of raw model output
 * - `detection`: source language detection
 * - `translator`: model-backed and stand-in translators
 * - `orchestrator`: the per-request policy tying these together
 */

// Re-export main types for easier usage
pub use self::detection::{Detection, LanguageDetector, WhatlangDetector};
pub use self::orchestrator::{Orchestrator, has_any_letter, is_passthrough};
pub use self::prompts::{PromptTemplate, build_prompt};
pub use self::sanitize::sanitize;
pub use self::translator::{
    FakeTranslator, ModelStatus, ModelTranslator, TranslationJob, Translator,
    UnconfiguredTranslator,
};
pub use self::types::{
    PromptMode, TranslationMode, TranslationOptions, TranslationRequest, TranslationResult,
};

// Submodules
pub mod detection;
pub mod orchestrator;
pub mod prompts;
pub mod sanitize;
pub mod translator;
pub mod types;
