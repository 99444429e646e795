use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::pipeline::PipelineFailure;

/// Failure taxonomy carried by every stage result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Bad extension, empty/oversized file, too little text. Client error.
    Validation,
    /// Rasterization or format conversion failed.
    Conversion,
    /// Transport or auth failure talking to the LLM.
    ModelCall,
    /// The model replied, but not with what was asked for.
    Parse,
}

impl FailureKind {
    pub fn status(self) -> StatusCode {
        match self {
            FailureKind::Validation => StatusCode::BAD_REQUEST,
            FailureKind::Conversion | FailureKind::Parse => StatusCode::UNPROCESSABLE_ENTITY,
            FailureKind::ModelCall => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            FailureKind::Validation => "VALIDATION_ERROR",
            FailureKind::Conversion => "CONVERSION_ERROR",
            FailureKind::ModelCall => "MODEL_CALL_ERROR",
            FailureKind::Parse => "PARSE_ERROR",
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineFailure),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "code": "VALIDATION_ERROR", "message": msg }),
            ),
            AppError::Pipeline(failure) => {
                let (status, code) = failure.error.status_and_code();
                if status.is_server_error() {
                    tracing::error!("Pipeline failed at {:?}: {}", failure.stage, failure.error);
                } else {
                    tracing::warn!("Pipeline failed at {:?}: {}", failure.stage, failure.error);
                }
                let mut body = json!({
                    "code": code,
                    "message": failure.error.to_string(),
                    "stage": failure.stage,
                });
                if let Some(excerpt) = failure.error.raw_response_excerpt() {
                    body["raw_response_excerpt"] = json!(excerpt);
                }
                (status, body)
            }
        };

        (status, Json(json!({ "error": body }))).into_response()
    }
}
