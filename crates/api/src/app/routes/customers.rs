use std::sync::Arc;

use axum::{Json, Router, extract::Extension, response::IntoResponse, routing::get};

use tradepost_infra::OrderStore;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", get(list_customers))
}

/// GET /api/customers
pub async fn list_customers(
    Extension(store): Extension<Arc<OrderStore>>,
) -> axum::response::Response {
    match store.list_customers().await {
        Ok(customers) => {
            let customers: Vec<_> = customers.into_iter().map(dto::customer_to_json).collect();
            Json(serde_json::json!({ "customers": customers })).into_response()
        }
        Err(e) => errors::order_error_to_response(e),
    }
}
