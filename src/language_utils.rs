//! Language registry and ISO language code helpers
//!
//! The registry is the fixed set of languages the service translates between.
//! Codes are ISO 639-1; the helpers below map the 3-letter codes produced by
//! language identification back onto that set.

use isolang::Language;
use serde::Serialize;

/// Sentinel source code asking for auto-detection
pub const AUTO: &str = "auto";

/// A language the service can translate from and to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SupportedLanguage {
    pub code: &'static str,
    pub name: &'static str,
}

const fn lang(code: &'static str, name: &'static str) -> SupportedLanguage {
    SupportedLanguage { code, name }
}

/// Supported languages, in display order
pub const LANGUAGES: &[SupportedLanguage] = &[
    lang("en", "English"),
    lang("es", "Spanish"),
    lang("fr", "French"),
    lang("de", "German"),
    lang("it", "Italian"),
    lang("pt", "Portuguese"),
    lang("nl", "Dutch"),
    lang("sv", "Swedish"),
    lang("no", "Norwegian"),
    lang("da", "Danish"),
    lang("fi", "Finnish"),
    lang("pl", "Polish"),
    lang("cs", "Czech"),
    lang("tr", "Turkish"),
    lang("ru", "Russian"),
    lang("uk", "Ukrainian"),
    lang("ar", "Arabic"),
    lang("he", "Hebrew"),
    lang("hi", "Hindi"),
    lang("bn", "Bengali"),
    lang("ur", "Urdu"),
    lang("ja", "Japanese"),
    lang("ko", "Korean"),
    lang("zh", "Chinese"),
];

/// Check whether a code belongs to the registry
pub fn is_supported(code: &str) -> bool {
    LANGUAGES.iter().any(|lang| lang.code == code)
}

/// Get the display name for a code, falling back to the code itself
pub fn language_name(code: &str) -> &str {
    LANGUAGES
        .iter()
        .find(|lang| lang.code == code)
        .map(|lang| lang.name)
        .unwrap_or(code)
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
///
/// Accepts 2-letter codes and ISO 639-3 codes. Macro-language members that
/// the registry knows under their macro code are folded onto it (Mandarin to
/// Chinese, Bokmål and Nynorsk to Norwegian).
pub fn normalize_to_part1(code: &str) -> Option<String> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 => Language::from_639_1(&normalized_code).map(|_| normalized_code),
        3 => {
            let folded = match normalized_code.as_str() {
                "cmn" => return Some("zh".to_string()),
                "nob" | "nno" => return Some("no".to_string()),
                other => other,
            };
            Language::from_639_3(folded)
                .and_then(|lang| lang.to_639_1())
                .map(|code| code.to_string())
        }
        _ => None,
    }
}
