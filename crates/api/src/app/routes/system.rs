use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use tradepost_infra::OrderStore;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", get(stats))
}

/// GET /health
///
/// Probe failure detail stays in the logs; the body only says which side
/// of the connection is down.
pub async fn health(Extension(store): Extension<Arc<OrderStore>>) -> axum::response::Response {
    match store.health().await {
        Ok(()) => Json(json!({
            "status": "healthy",
            "database": "connected",
        }))
        .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "unhealthy",
                "database": "disconnected",
            })),
        )
            .into_response(),
    }
}

/// GET /api/stats
pub async fn stats(Extension(store): Extension<Arc<OrderStore>>) -> axum::response::Response {
    match store.dashboard_stats().await {
        Ok(stats) => Json(dto::dashboard_to_json(stats)).into_response(),
        Err(e) => errors::order_error_to_response(e),
    }
}
