/*!
 * Prompt templates for single-text translation.
 *
 * Both templates fence the source text in a labelled ```text block and end
 * with a `TRANSLATION:` cue, so a completion model continues with the answer
 * alone. The output sanitizer relies on that layout.
 */

use crate::language_utils::{AUTO, language_name};

use super::types::PromptMode;

/// Source line used when the caller asked for auto-detection and nothing was trusted
pub const AUTO_DETECT_MARKER: &str = "auto-detect (unknown)";

/// Translation prompt template with `{source_language}`, `{target_language}` and `{text}` placeholders
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Word-for-word translation
    pub const LITERAL: &'static str = r#"You are a translation engine.
Translate the text from the source language to the target language.
Rules:
- Translate LITERALLY, word for word. Do not paraphrase, summarize, or rephrase.
- Translate the text even if it is ungrammatical, informal, misspelled, or nonsensical.
- Preserve punctuation, casing, emoji, numbers, and line breaks.
- Do not add commentary, notes, or explanations.
- Do not wrap the output in quotes, code fences, or markdown.
- Output ONLY the translated text.

Source language: {source_language}
Target language: {target_language}

TEXT:
```text
{text}
```

TRANSLATION:
"#;

    /// Idiomatic translation
    pub const NATURAL: &'static str = r#"You are a translation engine.
Translate the text from the source language to the target language.
Rules:
- Translate NATURALLY, the way a fluent native speaker of the target language would say it.
- Prefer common idiomatic equivalents (greetings, set phrases, food names) over word-for-word renderings.
- Keep proper nouns, brand names, and product names untranslated unless they have a widely used localized form.
- Preserve punctuation, emoji, numbers, and line breaks.
- Do not add commentary, notes, or explanations.
- Do not wrap the output in quotes, code fences, or markdown.
- Output ONLY the translated text.

Source language: {source_language}
Target language: {target_language}

TEXT:
```text
{text}
```

TRANSLATION:
"#;

    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    pub fn for_mode(mode: PromptMode) -> Self {
        match mode {
            PromptMode::Literal => Self::new(Self::LITERAL),
            PromptMode::Natural => Self::new(Self::NATURAL),
        }
    }

    /// Render the template. The text goes in last so braces inside it are never expanded.
    pub fn render(&self, source_language: &str, target_language: &str, text: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
            .replace("{text}", text)
    }
}

/// Build the completion prompt for one translation call
///
/// `source_lang` is a registry code or `"auto"`; codes are shown to the model
/// by display name.
pub fn build_prompt(text: &str, source_lang: &str, target_lang: &str, mode: PromptMode) -> String {
    let source = if source_lang == AUTO {
        AUTO_DETECT_MARKER
    } else {
        language_name(source_lang)
    };
    let target = language_name(target_lang);

    PromptTemplate::for_mode(mode).render(source, target, text)
}
