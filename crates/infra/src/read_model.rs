//! Query-side accessors for the listing endpoints.
//!
//! These queries take no row locks: a listing reflects whatever was
//! committed at the moment it ran. Only the mutators in [`crate::store`]
//! pin rows with `FOR UPDATE`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;
use tracing::{Span, instrument};

use tradepost_core::{CustomerId, OrderError, OrderId, OrderResult, ProductId};
use tradepost_orders::{Customer, OrderStatus};

use crate::store::{OrderStore, map_sqlx_error};

/// One row of the order listing, joined with the customer's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub id: OrderId,
    pub customer_name: String,
    pub current_status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for OrderSummary {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("current_status")?;
        let current_status = status.parse::<OrderStatus>().map_err(|e| {
            sqlx::Error::ColumnDecode { index: "current_status".into(), source: Box::new(e) }
        })?;

        Ok(OrderSummary {
            id: OrderId::new(row.try_get("id")?),
            customer_name: row.try_get("customer_name")?,
            current_status,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// One line of an order, joined with the product's name.
///
/// `price_per_unit` is the price captured when the line was first created,
/// not the product's current price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineDetail {
    pub product_name: String,
    pub quantity: i64,
    pub price_per_unit: Decimal,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for OrderLineDetail {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(OrderLineDetail {
            product_name: row.try_get("product_name")?,
            quantity: row.try_get("quantity")?,
            price_per_unit: row.try_get("price")?,
        })
    }
}

/// Catalog row with current price and remaining stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductListing {
    pub id: ProductId,
    pub name: String,
    pub category: Option<String>,
    pub price: Decimal,
    pub quantity: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for ProductListing {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductListing {
            id: ProductId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            price: row.try_get("price")?,
            quantity: row.try_get("quantity")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCount {
    pub status: String,
    pub order_count: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StatusCount {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(StatusCount {
            status: row.try_get("current_status")?,
            order_count: row.try_get("order_count")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopProduct {
    pub name: String,
    pub total_quantity: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for TopProduct {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(TopProduct {
            name: row.try_get("name")?,
            total_quantity: row.try_get("total_quantity")?,
        })
    }
}

/// Dashboard aggregates. The two queries are not snapshotted together; the
/// numbers may straddle a concurrent commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub orders_by_status: Vec<StatusCount>,
    pub top_products: Vec<TopProduct>,
}

impl OrderStore {
    /// List orders newest first, optionally filtered by status.
    #[instrument(skip(self), fields(status = status.map(|s| s.as_str())), err)]
    pub async fn list_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> OrderResult<Vec<OrderSummary>> {
        let span = Span::current();
        span.record("operation", "list_orders");

        let rows = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT o.id, c.name AS customer_name, o.current_status, o.created_at
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE $1::text IS NULL OR o.current_status = $1
            ORDER BY o.created_at DESC, o.id DESC
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_orders", e))?;

        Ok(rows)
    }

    /// Lines of one order. An order with no lines yet returns an empty list;
    /// an order that does not exist is `OrderNotFound`.
    #[instrument(skip(self), fields(order_id = %order_id), err)]
    pub async fn order_details(&self, order_id: OrderId) -> OrderResult<Vec<OrderLineDetail>> {
        let span = Span::current();
        span.record("operation", "order_details");

        let exists = sqlx::query("SELECT 1 FROM orders WHERE id = $1")
            .bind(order_id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("order_details", e))?;

        if exists.is_none() {
            return Err(OrderError::order_not_found(order_id));
        }

        let rows = sqlx::query_as::<_, OrderLineDetail>(
            r#"
            SELECT p.name AS product_name, oi.quantity, oi.price
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1
            ORDER BY oi.id
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("order_details", e))?;

        Ok(rows)
    }

    pub async fn list_products(&self) -> OrderResult<Vec<ProductListing>> {
        let rows = sqlx::query_as::<_, ProductListing>(
            r#"
            SELECT p.id, p.name, cat.name AS category, p.price, p.quantity
            FROM products p
            LEFT JOIN categories cat ON cat.id = p.category_id
            ORDER BY p.name, p.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        Ok(rows)
    }

    pub async fn list_customers(&self) -> OrderResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, name, email FROM customers ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_customers", e))?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }

    pub async fn dashboard_stats(&self) -> OrderResult<DashboardStats> {
        let orders_by_status = sqlx::query_as::<_, StatusCount>(
            r#"
            SELECT current_status, COUNT(*) AS order_count
            FROM orders
            GROUP BY current_status
            ORDER BY current_status
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("dashboard_stats", e))?;

        // SUM(bigint) is NUMERIC in Postgres; cast back for decoding.
        let top_products = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT p.name, SUM(oi.quantity)::BIGINT AS total_quantity
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            GROUP BY p.name
            ORDER BY total_quantity DESC, p.name
            LIMIT 10
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("dashboard_stats", e))?;

        Ok(DashboardStats { orders_by_status, top_products })
    }
}

#[derive(Debug)]
struct CustomerRow {
    id: i64,
    name: String,
    email: String,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for CustomerRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(CustomerRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
        })
    }
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: CustomerId::new(row.id),
            name: row.name,
            email: row.email,
        }
    }
}
