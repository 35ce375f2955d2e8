use crate::config::ConfigError;
use crate::lifecycle::LifecycleError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Top-level error for the service binary: everything the bootstrap path and
/// the CLI demo can fail with. Lifecycle failures inside HTTP handlers are
/// mapped to status codes in the lifecycle router instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("could not load configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("could not set up logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("http server failure: {0}")]
    Server(#[from] axum::Error),
    #[error("lifecycle rejected the operation: {0}")]
    Lifecycle(#[from] LifecycleError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Lifecycle(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
