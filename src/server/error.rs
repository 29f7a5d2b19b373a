use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use serde_json::json;

use crate::errors::{ErrorClass, TranslationError, ValidationError};

/// Errors returned by the HTTP handlers, rendered as `{"error": {"code", "message"}}`
#[derive(Debug)]
pub enum ApiError {
    /// Malformed body or a field outside its allowed range
    Validation(String),
    /// The request deadline passed before the translation finished
    Timeout,
    Translation(TranslationError),
}

impl From<TranslationError> for ApiError {
    fn from(error: TranslationError) -> Self {
        Self::Translation(error)
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        Self::Validation(error.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Translation(err) => match err.class() {
                ErrorClass::Input => StatusCode::BAD_REQUEST,
                ErrorClass::Availability | ErrorClass::Output => StatusCode::SERVICE_UNAVAILABLE,
                ErrorClass::Unclassified => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Timeout => "TRANSLATION_TIMEOUT",
            Self::Translation(err) => err.code(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Validation(reason) => reason.clone(),
            Self::Timeout => "The translation did not finish in time".to_string(),
            Self::Translation(err) => err.public_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Translation(err) = &self {
            if err.class() == ErrorClass::Unclassified {
                error!("Translation failed: {}", err);
            }
        }

        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.message(),
            }
        });
        (self.status(), Json(body)).into_response()
    }
}
