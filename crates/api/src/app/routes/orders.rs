use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};

use tradepost_core::{CustomerId, OrderId};
use tradepost_infra::OrderStore;
use tradepost_orders::{AddItem, OrderStatus};

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/add-item", post(add_item))
        .route("/:id", get(order_details))
        .route("/:id/status", put(update_order_status))
}

/// POST /api/orders/add-item
///
/// The whole flow is one store call; every outcome the transaction can
/// produce maps to a status in [`errors::order_error_to_response`].
pub async fn add_item(
    Extension(store): Extension<Arc<OrderStore>>,
    body: Result<Json<dto::AddItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_input", rejection.body_text());
        }
    };

    let cmd = match AddItem::new(body.order_id, body.product_id, body.quantity) {
        Ok(cmd) => cmd,
        Err(e) => return errors::order_error_to_response(e),
    };

    match store.add_item(cmd).await {
        Ok(added) => (StatusCode::OK, Json(dto::added_item_to_json(added))).into_response(),
        Err(e) => errors::order_error_to_response(e),
    }
}

/// POST /api/orders
pub async fn create_order(
    Extension(store): Extension<Arc<OrderStore>>,
    body: Result<Json<dto::CreateOrderRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_input", rejection.body_text());
        }
    };

    if body.customer_id <= 0 {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            "customer_id must be a positive integer",
        );
    }

    match store.create_order(CustomerId::new(body.customer_id)).await {
        Ok(order) => (StatusCode::CREATED, Json(dto::order_header_to_json(order))).into_response(),
        Err(e) => errors::order_error_to_response(e),
    }
}

/// GET /api/orders?status=processing
pub async fn list_orders(
    Extension(store): Extension<Arc<OrderStore>>,
    Query(query): Query<dto::ListOrdersQuery>,
) -> axum::response::Response {
    let status = match query.status.as_deref().map(str::parse::<OrderStatus>).transpose() {
        Ok(status) => status,
        Err(e) => return errors::order_error_to_response(e),
    };

    match store.list_orders(status).await {
        Ok(orders) => {
            let orders: Vec<_> = orders.into_iter().map(dto::order_summary_to_json).collect();
            Json(serde_json::json!({ "orders": orders })).into_response()
        }
        Err(e) => errors::order_error_to_response(e),
    }
}

/// GET /api/orders/:id
pub async fn order_details(
    Extension(store): Extension<Arc<OrderStore>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: OrderId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::order_error_to_response(e),
    };

    match store.order_details(order_id).await {
        Ok(lines) => {
            let items: Vec<_> = lines.into_iter().map(dto::order_line_to_json).collect();
            Json(serde_json::json!({
                "order_id": order_id.as_i64(),
                "items": items,
            }))
            .into_response()
        }
        Err(e) => errors::order_error_to_response(e),
    }
}

/// PUT /api/orders/:id/status
pub async fn update_order_status(
    Extension(store): Extension<Arc<OrderStore>>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateStatusRequest>, JsonRejection>,
) -> axum::response::Response {
    let order_id: OrderId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::order_error_to_response(e),
    };

    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_input", rejection.body_text());
        }
    };

    let status: OrderStatus = match body.status.parse() {
        Ok(status) => status,
        Err(e) => return errors::order_error_to_response(e),
    };

    match store.update_order_status(order_id, status).await {
        Ok(order) => (StatusCode::OK, Json(dto::order_header_to_json(order))).into_response(),
        Err(e) => errors::order_error_to_response(e),
    }
}
