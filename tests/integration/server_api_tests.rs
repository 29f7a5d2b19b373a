/*!
 * HTTP API tests, driven through the router without binding a socket
 */

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use locallingua::app_config::{Config, ServerConfig};
use locallingua::app_controller::Controller;
use locallingua::server::create_router;
use locallingua::translation::{Detection, UnconfiguredTranslator};

use crate::common::controller_with;
use crate::common::mock_providers::{FixedDetector, StubBehavior, StubTranslator};

fn router_for(controller: Controller) -> Router {
    create_router(Arc::new(controller), &ServerConfig::default())
}

fn echo_router() -> (Router, Arc<StubTranslator>) {
    let stub = StubTranslator::echo();
    let router = router_for(controller_with(stub.clone(), Detection::new("en", 0.9)));
    (router, stub)
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_shouldReportBackendStatus() {
    let (router, _) = echo_router();

    let (status, body) = send(router, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "ok", "model_loaded": true, "model_name": "stub" })
    );
}

#[tokio::test]
async fn test_health_withoutModel_shouldStillAnswerOk() {
    let controller = Controller::with_components(
        Config::default(),
        Arc::new(FixedDetector::new(Detection::none())),
        Arc::new(UnconfiguredTranslator::not_configured()),
    );

    let (status, body) = send(router_for(controller), get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model_loaded"], false);
    assert_eq!(body["model_name"], Value::Null);
}

#[tokio::test]
async fn test_languages_shouldListRegistryInOrder() {
    let (router, _) = echo_router();

    let (status, body) = send(router, get("/api/languages")).await;

    assert_eq!(status, StatusCode::OK);
    let languages = body["languages"].as_array().unwrap();
    assert_eq!(languages.len(), 24);
    assert_eq!(languages[0], json!({ "code": "en", "name": "English" }));
    assert_eq!(languages[23], json!({ "code": "zh", "name": "Chinese" }));
}

#[tokio::test]
async fn test_translate_smartPassthrough_shouldReturnNaturalResult() {
    let (router, stub) = echo_router();

    let (status, body) = send(
        router,
        post_json(
            "/api/translate",
            r#"{"text":"cheeseburger","source_lang":"en","target_lang":"es"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["translated_text"], "NAT:cheeseburger");
    assert_eq!(body["used_mode"], "natural");
    assert_eq!(body["detected_source_lang"], Value::Null);
    assert_eq!(body["detection_confidence"], Value::Null);
    assert!(body["latency_ms"].is_u64());
    assert_eq!(stub.call_count(), 2);
}

#[tokio::test]
async fn test_translate_defaults_shouldUseAutoAndSmart() {
    let stub = StubTranslator::new(StubBehavior::Literal("Hola".to_string()));
    let router = router_for(controller_with(stub.clone(), Detection::new("en", 0.9)));

    let (status, body) = send(
        router,
        post_json("/api/translate", r#"{"text":"Hello","target_lang":"es"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["translated_text"], "Hola");
    assert_eq!(body["used_mode"], "literal");
    assert_eq!(body["detected_source_lang"], "en");
    assert_eq!(body["detection_confidence"], 0.9);
    assert_eq!(stub.calls()[0].source_lang, "en");
}

#[tokio::test]
async fn test_translate_withNullSeed_shouldBeAccepted() {
    let (router, _) = echo_router();

    let (status, _) = send(
        router,
        post_json(
            "/api/translate",
            r#"{"text":"Hello","source_lang":"en","target_lang":"fr","options":{"mode":"literal","seed":null}}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_translate_withNegativeSeed_shouldBeAccepted() {
    let (router, stub) = echo_router();

    let (status, _) = send(
        router,
        post_json(
            "/api/translate",
            r#"{"text":"Hello","source_lang":"en","target_lang":"fr","options":{"mode":"literal","seed":-1}}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stub.calls()[0].options.seed, Some(-1));
}

#[tokio::test]
async fn test_translate_unsupportedTarget_shouldReturn400() {
    let (router, stub) = echo_router();

    let (status, body) = send(
        router,
        post_json("/api/translate", r#"{"text":"Hello","target_lang":"xx"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "UNSUPPORTED_TARGET_LANG");
    assert!(body["error"]["message"].as_str().unwrap().contains("xx"));
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn test_translate_unsupportedSource_shouldReturn400() {
    let (router, _) = echo_router();

    let (status, body) = send(
        router,
        post_json(
            "/api/translate",
            r#"{"text":"Hello","source_lang":"klingon","target_lang":"es"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "UNSUPPORTED_SOURCE_LANG");
}

#[tokio::test]
async fn test_translate_invalidBodies_shouldReturn422() {
    let too_long = format!(r#"{{"text":"{}","target_lang":"es"}}"#, "a".repeat(10_001));
    let bodies = [
        r#"{"text":"","target_lang":"es"}"#.to_string(),
        too_long,
        r#"{"text":"Hello"}"#.to_string(),
        r#"{"text":"Hello","target_lang":"es","options":{"temperature":2.5}}"#.to_string(),
        r#"{"text":"Hello","target_lang":"es","options":{"top_p":1.5}}"#.to_string(),
        r#"{"text":"Hello","target_lang":"es","options":{"max_tokens":0}}"#.to_string(),
        r#"{"text":"Hello","target_lang":"es","options":{"mode":"poetic"}}"#.to_string(),
        "{ not json".to_string(),
    ];

    for raw in bodies {
        let (router, stub) = echo_router();
        let (status, body) = send(router, post_json("/api/translate", &raw)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "body: {}", raw);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(stub.call_count(), 0);
    }
}

#[tokio::test]
async fn test_translate_maxLengthText_shouldBeAccepted() {
    let stub = StubTranslator::new(StubBehavior::Literal("b".to_string()));
    let router = router_for(controller_with(stub, Detection::none()));
    let body = format!(
        r#"{{"text":"{}","source_lang":"en","target_lang":"es"}}"#,
        "a".repeat(10_000)
    );

    let (status, _) = send(router, post_json("/api/translate", &body)).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_translate_withoutModel_shouldReturn503() {
    let controller = Controller::with_components(
        Config::default(),
        Arc::new(FixedDetector::new(Detection::none())),
        Arc::new(UnconfiguredTranslator::not_configured()),
    );

    let (status, body) = send(
        router_for(controller),
        post_json("/api/translate", r#"{"text":"Hello","target_lang":"es"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "MODEL_NOT_CONFIGURED");
}

#[tokio::test]
async fn test_translate_emptyModelOutput_shouldReturn503() {
    let stub = StubTranslator::new(StubBehavior::Always("   ".to_string()));
    let router = router_for(controller_with(stub, Detection::none()));

    let (status, body) = send(
        router,
        post_json(
            "/api/translate",
            r#"{"text":"Hello","source_lang":"en","target_lang":"es"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "MODEL_EMPTY_OUTPUT");
}

#[tokio::test]
async fn test_translate_pastDeadline_shouldReturn504() {
    let stub = StubTranslator::new(StubBehavior::Delayed(Duration::from_secs(5)));
    let config = ServerConfig {
        request_timeout_secs: Some(1),
        ..ServerConfig::default()
    };
    let router = create_router(
        Arc::new(controller_with(stub, Detection::none())),
        &config,
    );

    let (status, body) = send(
        router,
        post_json(
            "/api/translate",
            r#"{"text":"Hello","source_lang":"en","target_lang":"es"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"]["code"], "TRANSLATION_TIMEOUT");
}

#[tokio::test]
async fn test_cors_preflight_shouldAllowConfiguredOriginOnly() {
    let preflight = |origin: &str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/translate")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    };

    let (router, _) = echo_router();
    let response = router.oneshot(preflight("http://localhost:5173")).await.unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );

    let (router, _) = echo_router();
    let response = router.oneshot(preflight("http://evil.example")).await.unwrap();
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
