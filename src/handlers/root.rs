use axum::{extract::State, http::StatusCode};
use serde_json::{json, Value};

use crate::middleware::ApiResponse;
use crate::server::AppState;

/// GET / - Service banner
pub async fn root(State(state): State<AppState>) -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Hierarchical category records over a JSON document store",
        "storage": state.store.backend(),
        "endpoints": {
            "home": "/",
            "health": "/health",
            "categories": "/categories[/:id]",
            "bulk": "/categories/sync/create",
        }
    }))
}

/// GET /health - Store connectivity
pub async fn health(State(state): State<AppState>) -> ApiResponse<Value> {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "storage": state.store.backend()
        })),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiResponse::with_status(
                json!({
                    "status": "degraded",
                    "timestamp": now,
                    "storage": state.store.backend(),
                    "storage_error": "store unavailable"
                }),
                StatusCode::SERVICE_UNAVAILABLE,
            )
        }
    }
}
