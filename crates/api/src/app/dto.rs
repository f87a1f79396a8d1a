use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;

use tradepost_infra::{
    DashboardStats, OrderLineDetail, OrderSummary, ProductListing,
};
use tradepost_orders::{AddedItem, Customer, Order};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

/// Prices are NUMERIC(10,2) and always fit an f64, so they go on the wire
/// as JSON numbers rather than decimal strings.
fn price_to_json(price: Decimal) -> f64 {
    price.to_f64().unwrap_or_default()
}

pub fn added_item_to_json(added: AddedItem) -> serde_json::Value {
    serde_json::json!({
        "action": added.action.as_str(),
        "order_id": added.order_id.as_i64(),
        "product_id": added.product_id.as_i64(),
        "final_quantity": added.final_quantity,
        "product_name": added.product_name,
        "price_per_unit": price_to_json(added.price_per_unit),
    })
}

/// Header shape shared by order creation and status updates.
pub fn order_header_to_json(order: Order) -> serde_json::Value {
    serde_json::json!({
        "order_id": order.id.as_i64(),
        "current_status": order.status.as_str(),
    })
}

pub fn order_summary_to_json(rm: OrderSummary) -> serde_json::Value {
    serde_json::json!({
        "id": rm.id.as_i64(),
        "customer_name": rm.customer_name,
        "current_status": rm.current_status.as_str(),
        "created_at": rm.created_at.to_rfc3339(),
    })
}

pub fn order_line_to_json(rm: OrderLineDetail) -> serde_json::Value {
    serde_json::json!({
        "product_name": rm.product_name,
        "quantity": rm.quantity,
        "price_per_unit": price_to_json(rm.price_per_unit),
    })
}

pub fn product_to_json(rm: ProductListing) -> serde_json::Value {
    serde_json::json!({
        "id": rm.id.as_i64(),
        "name": rm.name,
        "category": rm.category,
        "price": price_to_json(rm.price),
        "quantity": rm.quantity,
    })
}

pub fn customer_to_json(customer: Customer) -> serde_json::Value {
    serde_json::json!({
        "id": customer.id.as_i64(),
        "name": customer.name,
        "email": customer.email,
    })
}

pub fn dashboard_to_json(stats: DashboardStats) -> serde_json::Value {
    serde_json::json!({
        "orders_by_status": stats.orders_by_status.into_iter().map(|s| serde_json::json!({
            "status": s.status,
            "count": s.order_count,
        })).collect::<Vec<_>>(),
        "top_products": stats.top_products.into_iter().map(|p| serde_json::json!({
            "name": p.name,
            "total_quantity": p.total_quantity,
        })).collect::<Vec<_>>(),
    })
}
