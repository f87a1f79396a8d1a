use std::sync::Arc;

use axum::{Json, Router, extract::Extension, response::IntoResponse, routing::get};

use tradepost_infra::OrderStore;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", get(list_products))
}

/// GET /api/products
pub async fn list_products(
    Extension(store): Extension<Arc<OrderStore>>,
) -> axum::response::Response {
    match store.list_products().await {
        Ok(products) => {
            let products: Vec<_> = products.into_iter().map(dto::product_to_json).collect();
            Json(serde_json::json!({ "products": products })).into_response()
        }
        Err(e) => errors::order_error_to_response(e),
    }
}
