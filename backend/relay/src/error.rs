use std::any::Any;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use form::{RecordPayload, ValidationError};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::error;

use crate::client::ForwardError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Local processing may have succeeded; `processed` carries what would
    /// have been stored.
    #[error("Persistence service unavailable: {source}")]
    Upstream {
        source: ForwardError,
        processed: Option<RecordPayload>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Upstream { source, processed } => {
                error!("Forward failed: {source}");

                let message = if processed.is_some() {
                    "Data validated locally but could not be persisted"
                } else {
                    "Persistence service unavailable"
                };

                let mut body = json!({
                    "success": false,
                    "message": message,
                    "error": source.to_string(),
                });
                if let Some(processed) = processed {
                    body["processedData"] = json!(processed);
                }
                if let Some(status) = source.status() {
                    body["downstreamStatus"] = Value::from(status);
                }

                (StatusCode::BAD_GATEWAY, Json(body)).into_response()
            }
            other => {
                let status = match other {
                    AppError::MalformedPayload(_) | AppError::Validation(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    error!("{other}");
                }

                let body = json!({
                    "success": false,
                    "message": other.to_string(),
                });

                (status, Json(body)).into_response()
            }
        }
    }
}

pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "handler panicked".to_string());

    AppError::Internal(detail).into_response()
}
