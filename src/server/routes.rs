use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::debug;
use serde_json::{Value, json};

use super::ServerState;
use super::error::ApiError;
use crate::app_controller::HealthStatus;
use crate::translation::{TranslationRequest, TranslationResult};

pub fn create_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/languages", get(list_languages))
        .route("/api/translate", post(translate))
}

async fn health_check(State(state): State<ServerState>) -> Json<HealthStatus> {
    Json(state.controller.health())
}

async fn list_languages(State(state): State<ServerState>) -> Json<Value> {
    Json(json!({ "languages": state.controller.languages() }))
}

async fn translate(
    State(state): State<ServerState>,
    payload: Result<Json<TranslationRequest>, JsonRejection>,
) -> Result<Json<TranslationResult>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    request.validate()?;

    debug!(
        "POST /api/translate {} -> {} ({} chars)",
        request.source_lang,
        request.target_lang,
        request.text.chars().count()
    );

    let translation = state.controller.translate(&request);
    let result = match state.request_timeout {
        Some(deadline) => tokio::time::timeout(deadline, translation)
            .await
            .map_err(|_| ApiError::Timeout)??,
        None => translation.await?,
    };

    Ok(Json(result))
}
