use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
};
use chrono::{Local, Utc};
use form::{FormInput, validate};
use serde_json::json;
use tracing::info;

use crate::{ENDPOINTS, error::AppError, state::AppState};

pub async fn post_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<FormInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = body.map_err(|rejection| AppError::MalformedPayload(rejection.body_text()))?;

    let submission = validate(&input, Local::now().date_naive())?;
    let action = submission.action;
    let operation = action.operation();
    let processed = submission.into_payload(Utc::now());

    info!(
        "Forwarding {action} for {} as {}",
        processed.mobile,
        operation.http_method()
    );

    let downstream = match state.vault.forward(operation, &processed).await {
        Ok(downstream) => downstream,
        Err(source) => {
            return Err(AppError::Upstream {
                source,
                processed: Some(processed),
            });
        }
    };

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": format!("Data validated and forwarded ({action})"),
            "httpMethod": operation.http_method(),
            "processedData": processed,
            "downstreamResponse": downstream,
        })),
    ))
}

pub async fn getdata_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let downstream = state
        .vault
        .list()
        .await
        .map_err(|source| AppError::Upstream {
            source,
            processed: None,
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "Data retrieved from persistence service",
        "data": downstream,
    })))
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "relay",
        "vault": state.vault.base_url(),
        "timestamp": Utc::now(),
        "endpoints": ENDPOINTS,
    }))
}

pub async fn not_found_handler(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Route not found",
            "path": uri.path(),
            "method": method.as_str(),
            "availableEndpoints": ENDPOINTS,
        })),
    )
}
