/*!
 * End-to-end translation scenarios through the controller
 */

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use locallingua::app_config::Config;
use locallingua::app_controller::Controller;
use locallingua::model_client::ModelClient;
use locallingua::translation::{
    Detection, FakeTranslator, ModelTranslator, PromptMode, TranslationMode, TranslationOptions,
    TranslationRequest,
};

use crate::common;
use crate::common::mock_providers::{
    CountingEngine, FixedDetector, PromptEchoEngine, ScriptedLoader,
};

fn model_controller(
    engine: Arc<dyn locallingua::providers::InferenceEngine>,
    model_path: PathBuf,
    model_name: Option<String>,
    detection: Detection,
) -> (Controller, Arc<ScriptedLoader>) {
    common::init_logging();
    let loader = ScriptedLoader::new(engine);
    let client = Arc::new(ModelClient::new(loader.clone(), 1));
    let translator = Arc::new(ModelTranslator::new(client, model_path, model_name));
    let controller = Controller::with_components(
        Config::default(),
        Arc::new(FixedDetector::new(detection)),
        translator,
    );
    (controller, loader)
}

#[tokio::test]
async fn test_modelBackend_shouldSanitizeFencedReply() {
    let engine = CountingEngine::new("```text\nHola mundo\n```\n", Duration::ZERO);
    let (controller, loader) = model_controller(
        engine.clone(),
        PathBuf::from("/models/unused.gguf"),
        None,
        Detection::none(),
    );

    let result = controller
        .translate(&TranslationRequest::new("Hello world", "en", "es"))
        .await
        .unwrap();

    assert_eq!(result.translated_text, "Hola mundo");
    assert_eq!(result.used_mode, PromptMode::Literal);
    assert_eq!(engine.completed(), 1);
    assert_eq!(loader.load_count(), 1);
}

#[tokio::test]
async fn test_modelBackend_shouldPromptWithLanguageNamesAndFencedText() {
    let (controller, _) = model_controller(
        Arc::new(PromptEchoEngine),
        PathBuf::from("/models/unused.gguf"),
        None,
        Detection::none(),
    );
    let request = TranslationRequest::new("Hello", "en", "es").with_mode(TranslationMode::Natural);

    let result = controller.translate(&request).await.unwrap();

    let prompt = result.translated_text;
    assert!(prompt.contains("Source language: English"));
    assert!(prompt.contains("Target language: Spanish"));
    assert!(prompt.contains("```text\nHello\n```"));
    assert!(prompt.contains("Translate NATURALLY"));
    assert!(prompt.ends_with("TRANSLATION:"));
}

#[tokio::test]
async fn test_modelBackend_untrustedDetection_shouldPromptWithAutoMarker() {
    let (controller, _) = model_controller(
        Arc::new(PromptEchoEngine),
        PathBuf::from("/models/unused.gguf"),
        None,
        Detection::new("de", 0.1),
    );

    let result = controller
        .translate(&TranslationRequest::new("Hallo", "auto", "en"))
        .await
        .unwrap();

    assert!(result.translated_text.contains("Source language: auto-detect (unknown)"));
    assert_eq!(result.detected_source_lang.as_deref(), Some("de"));
    assert_eq!(result.detection_confidence, Some(0.1));
}

#[tokio::test]
async fn test_modelBackend_samplingOptions_shouldReachEngineVerbatim() {
    let engine = CountingEngine::new("Hallo", Duration::ZERO);
    let (controller, _) = model_controller(
        engine.clone(),
        PathBuf::from("/models/unused.gguf"),
        None,
        Detection::none(),
    );
    let seeded = TranslationOptions {
        mode: TranslationMode::Literal,
        temperature: 0.7,
        top_p: 0.85,
        max_tokens: 128,
        seed: Some(-1),
    };
    let unseeded = TranslationOptions {
        seed: None,
        ..seeded
    };

    for options in [seeded, unseeded] {
        let request = TranslationRequest::new("Hello", "en", "de").with_options(options);
        controller.translate(&request).await.unwrap();
    }

    let requests = engine.requests();
    assert_eq!(requests.len(), 2);
    for (request, expected_seed) in requests.iter().zip([Some(-1), None]) {
        assert!(request.prompt.contains("```text\nHello\n```"));
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.top_p, 0.85);
        assert_eq!(request.max_tokens, 128);
        assert_eq!(request.seed, expected_seed);
    }
}

#[tokio::test]
async fn test_modelBackend_concurrentRequests_shouldShareOneEngine() {
    let engine = CountingEngine::new("Hola", Duration::from_millis(20));
    let (controller, loader) = model_controller(
        engine.clone(),
        PathBuf::from("/models/unused.gguf"),
        None,
        Detection::none(),
    );
    let controller = Arc::new(controller);

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let controller = controller.clone();
            tokio::spawn(async move {
                controller
                    .translate(&TranslationRequest::new("Hello", "en", "es"))
                    .await
            })
        })
        .collect();

    for result in futures::future::join_all(handles).await {
        assert_eq!(result.unwrap().unwrap().translated_text, "Hola");
    }
    assert_eq!(loader.load_count(), 1);
    assert_eq!(engine.max_seen(), 1);
}

#[test]
fn test_modelBackend_health_shouldReportFileStemOrConfiguredName() {
    let dir = common::create_temp_dir().unwrap();
    let model = common::create_test_file(dir.path(), "tiny-q4.gguf", "gguf").unwrap();

    let (controller, _) = model_controller(
        Arc::new(PromptEchoEngine),
        model.clone(),
        None,
        Detection::none(),
    );
    let health = controller.health();
    assert!(health.model_loaded);
    assert_eq!(health.model_name.as_deref(), Some("tiny-q4"));

    let (controller, _) = model_controller(
        Arc::new(PromptEchoEngine),
        model,
        Some("Tiny Model".to_string()),
        Detection::none(),
    );
    assert_eq!(controller.health().model_name.as_deref(), Some("Tiny Model"));

    let (controller, _) = model_controller(
        Arc::new(PromptEchoEngine),
        dir.path().join("gone.gguf"),
        Some("Gone".to_string()),
        Detection::none(),
    );
    let health = controller.health();
    assert!(!health.model_loaded);
    assert_eq!(health.model_name, None);
}

#[tokio::test]
async fn test_withConfig_fakeAllowedWithoutModel_shouldUseFakeTranslator() {
    common::init_logging();
    let mut config = Config::default();
    config.model.allow_fake_translator = true;

    let controller = Controller::with_config(config).unwrap();
    let health = controller.health();
    assert!(health.model_loaded);
    assert_eq!(health.model_name.as_deref(), Some(FakeTranslator::NAME));

    let result = controller
        .translate(&TranslationRequest::new("Hello   world", "en", "es"))
        .await
        .unwrap();
    assert_eq!(result.translated_text, "[fake en->es] Hello world");
    assert_eq!(result.used_mode, PromptMode::Literal);
}

#[tokio::test]
async fn test_withConfig_missingModelWithFakeAllowed_shouldUseFakeTranslator() {
    let dir = common::create_temp_dir().unwrap();
    let mut config = Config::default();
    config.model.model_path = Some(dir.path().join("absent.gguf"));
    config.model.allow_fake_translator = true;

    let controller = Controller::with_config(config).unwrap();

    assert_eq!(
        controller.health().model_name.as_deref(),
        Some(FakeTranslator::NAME)
    );
}

#[tokio::test]
async fn test_withConfig_missingModel_shouldFailWithModelNotFound() {
    let dir = common::create_temp_dir().unwrap();
    let mut config = Config::default();
    config.model.model_path = Some(dir.path().join("absent.gguf"));

    let controller = Controller::with_config(config).unwrap();
    assert!(!controller.health().model_loaded);

    let err = controller
        .translate(&TranslationRequest::new("Hello", "en", "es"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "MODEL_NOT_FOUND");

    let err = controller
        .translate(&TranslationRequest::new("Hello", "en", "xx"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "UNSUPPORTED_TARGET_LANG");
}

#[tokio::test]
async fn test_withConfig_noModel_shouldFailWithModelNotConfigured() {
    let controller = Controller::with_config(Config::default()).unwrap();

    let health = controller.health();
    assert_eq!(health.status, "ok");
    assert!(!health.model_loaded);

    let err = controller
        .translate(&TranslationRequest::new("Hello", "en", "es"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "MODEL_NOT_CONFIGURED");
}

#[test]
fn test_withConfig_existingModel_shouldSelectModelBackendWithoutLoading() {
    let dir = common::create_temp_dir().unwrap();
    let model = common::create_test_file(dir.path(), "small.gguf", "gguf").unwrap();
    let mut config = Config::default();
    config.model.model_path = Some(model);

    let controller = Controller::with_config(config).unwrap();
    let health = controller.health();

    assert!(health.model_loaded);
    assert_eq!(health.model_name.as_deref(), Some("small"));
}

#[test]
fn test_withConfig_invalidConfig_shouldFail() {
    let mut config = Config::default();
    config.model.max_concurrency = 0;
    assert!(Controller::with_config(config).is_err());
}

#[test]
fn test_languages_shouldExposeRegistry() {
    let controller = Controller::with_config(Config::default()).unwrap();
    let languages = controller.languages();
    assert_eq!(languages.len(), 24);
    assert_eq!(languages[0].code, "en");
}
