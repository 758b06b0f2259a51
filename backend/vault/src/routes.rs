use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use crate::{
    ENDPOINTS,
    error::AppError,
    models::{DeleteRequest, Record, RecordInput, text},
    records::Upserted,
    state::AppState,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Record>,
    pub retrieved_at: DateTime<Utc>,
}

fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(body)| body)
        .map_err(|rejection| AppError::MalformedPayload(rejection.body_text()))
}

pub async fn insert_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RecordInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let new = payload(body)?.into_new(Utc::now())?;
    let record = state.records.insert(new).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Record created",
            "operation": "create",
            "data": record,
        })),
    ))
}

pub async fn upsert_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RecordInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let new = payload(body)?.into_new(Utc::now())?;
    let outcome = state.records.upsert(new).await?;

    let (status, message) = match &outcome {
        Upserted::Created(_) => (
            StatusCode::CREATED,
            "No record found for this mobile, created a new one",
        ),
        Upserted::Updated(_) => (StatusCode::OK, "Record updated"),
    };

    Ok((
        status,
        Json(json!({
            "success": true,
            "message": message,
            "operation": outcome.operation(),
            "data": outcome.record(),
        })),
    ))
}

pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let mobile = text(payload(body)?.mobile).ok_or(AppError::MissingFields(vec!["mobile"]))?;

    let Some(record) = state.records.delete(&mobile).await? else {
        warn!("Delete requested for unknown mobile {mobile}");
        return Err(AppError::NotFound(mobile));
    };

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Record deleted",
            "operation": "delete",
            "data": record,
        })),
    ))
}

pub async fn list_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListResponse>, AppError> {
    let data = state.records.list().await?;

    Ok(Json(ListResponse {
        success: true,
        count: data.len(),
        data,
        retrieved_at: Utc::now(),
    }))
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let probe = match state.records.ping().await {
        Ok(()) => state.records.count().await,
        Err(e) => Err(e),
    };

    let (status, store, records) = match probe {
        Ok(count) => (StatusCode::OK, "connected", Some(count)),
        Err(e) => {
            warn!("Health check failed: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, "disconnected", None)
        }
    };

    (
        status,
        Json(json!({
            "status": if status.is_success() { "ok" } else { "degraded" },
            "service": "vault",
            "backend": state.records.backend(),
            "store": store,
            "records": records,
            "timestamp": Utc::now(),
        })),
    )
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

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, header::CONTENT_TYPE},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::{config::Config, memory::MemoryStore, router};

    fn app() -> Router {
        let config = Config {
            port: 0,
            redis_url: None,
        };

        router(AppState::with_store(config, Arc::new(MemoryStore::new())))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn asha(action: &str) -> Value {
        json!({
            "name": "Asha Rao",
            "mobile": "9876543210",
            "dob": "1995-01-01",
            "age": 29,
            "action": action,
            "processedAt": "2024-06-01T12:00:00Z",
        })
    }

    #[tokio::test]
    async fn test_insert_then_list() {
        let app = app();

        let (status, body) = call(&app, Method::POST, "/api/postdata/db", Some(asha("create"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["mobile"], "9876543210");
        assert!(body["data"]["id"].is_string());
        assert!(body["data"]["createdAt"].is_string());

        let (status, body) = call(&app, Method::GET, "/api/getdata/db", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_missing_fields() {
        let app = app();

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/postdata/db",
            Some(json!({ "name": "Asha Rao", "mobile": "9876543210" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Missing required fields: dob, age, action");
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let app = app();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/postdata/db")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upsert_reports_create_then_update() {
        let app = app();

        let (status, body) = call(&app, Method::PUT, "/api/postdata/db", Some(asha("update"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["operation"], "create");

        let mut renamed = asha("update");
        renamed["name"] = json!("Asha Menon");
        let (status, body) = call(&app, Method::PUT, "/api/postdata/db", Some(renamed)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["operation"], "update");
        assert_eq!(body["data"]["name"], "Asha Menon");
        assert_eq!(body["data"]["mobile"], "9876543210");

        let (_, body) = call(&app, Method::GET, "/api/getdata/db", None).await;
        assert_eq!(body["count"], 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let app = app();
        call(&app, Method::POST, "/api/postdata/db", Some(asha("create"))).await;

        let (status, body) = call(&app, Method::DELETE, "/api/postdata/db", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = call(
            &app,
            Method::DELETE,
            "/api/postdata/db",
            Some(json!({ "mobile": "6000000000" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "No record found for mobile 6000000000");

        let (_, body) = call(&app, Method::GET, "/api/getdata/db", None).await;
        assert_eq!(body["count"], 1);

        let (status, body) = call(
            &app,
            Method::DELETE,
            "/api/postdata/db",
            Some(json!({ "mobile": "9876543210" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Asha Rao");

        let (_, body) = call(&app, Method::GET, "/api/getdata/db", None).await;
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn test_known_path_wrong_method_lists_endpoints() {
        let app = app();

        let (status, body) = call(&app, Method::PATCH, "/api/postdata/db", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["method"], "PATCH");
        assert_eq!(body["path"], "/api/postdata/db");
        assert_eq!(body["availableEndpoints"].as_array().unwrap().len(), ENDPOINTS.len());
    }

    #[tokio::test]
    async fn test_health_and_fallback() {
        let app = app();

        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["store"], "connected");
        assert_eq!(body["backend"], "memory");
        assert_eq!(body["records"], 0);

        let (status, body) = call(&app, Method::GET, "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["path"], "/nope");
        assert_eq!(body["method"], "GET");
        assert_eq!(body["availableEndpoints"].as_array().unwrap().len(), ENDPOINTS.len());
    }
}
