/*!
 * # LocalLingua - local-first text translation
 *
 * A Rust library and HTTP service that translates short texts with a local
 * GGUF model served by llama.cpp. No text leaves the machine.
 *
 * ## Features
 *
 * - 24 supported languages plus source auto-detection
 * - Literal, natural and smart (literal with a natural retry) modes
 * - Cleanup of fenced or chatty model output
 * - Lazy model loading and a bounded number of concurrent completions
 * - A deterministic fake translator for development without a model
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration file and environment overrides
 * - `app_controller`: Backend selection, health and language listing
 * - `translation`: Prompting, sanitizing, detection and the orchestrator
 * - `model_client`: Lazy engine with a concurrency gate
 * - `providers`: Inference engines:
 *   - `providers::llama_server`: llama.cpp `llama-server` child process
 * - `server`: HTTP API
 * - `language_utils`: Supported language registry and ISO code mapping
 * - `errors`: Error types for each layer
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod language_utils;
pub mod model_client;
pub mod providers;
pub mod server;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, HealthStatus};
pub use errors::{ModelError, ProviderError, TranslationError, ValidationError};
pub use language_utils::{LANGUAGES, SupportedLanguage, is_supported};
pub use model_client::ModelClient;
pub use translation::{TranslationMode, TranslationOptions, TranslationRequest, TranslationResult};
