use axum::response::IntoResponse;
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;

/// GET / - service description
pub async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Armada API",
        "version": version,
        "description": "Container-orchestration management API",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "pods": "/v1/pods[/:uuid] (protected)",
            "pods_detail": "/v1/pods/detail (protected)",
            "identity": "/v1/auth/context (protected)",
        }
    }))
}

/// GET /health - liveness plus database connectivity
pub async fn health() -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
