//! Postgres-backed order store.
//!
//! All order mutations run inside a single transaction on a pool-managed
//! connection. Rows are pinned with `SELECT ... FOR UPDATE` so every check
//! made during the transaction is made against current, committed state.
//!
//! ## Lock Ordering
//!
//! Every mutating transaction acquires row locks in the same sequence:
//!
//! 1. `orders` row
//! 2. `products` row
//! 3. `order_items` row (when one exists for the pair)
//!
//! Concurrent writers touching the same rows therefore queue instead of
//! deadlocking. A transaction that cannot acquire a lock within
//! `lock_timeout` fails with SQLSTATE `55P03` and surfaces as
//! [`OrderError::LockTimeout`].
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `OrderError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | OrderError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (lock not available) | `55P03` | `LockTimeout` | Lock wait exceeded `lock_timeout` under contention |
//! | Database (unique violation) | `23505` | `Storage` | Schema backstop; the line merge keeps the pair unique |
//! | Database (foreign key violation) | `23503` | `Storage` | Schema backstop (except order creation, which maps it to `CustomerNotFound`) |
//! | Database (check violation) | `23514` | `Storage` | Schema backstop; in-transaction checks fire first |
//! | Database (other) | Any other | `Storage` | Other database errors |
//! | PoolClosed | N/A | `Storage` | Connection pool was closed |
//! | Other | N/A | `Storage` | Network errors, connection failures, etc. |
//!
//! Driver detail never crosses this boundary: it is logged here, and the
//! caller sees only the name of the operation that failed.
//!
//! ## Thread Safety
//!
//! `OrderStore` is `Send + Sync` and can be shared across threads. All
//! operations use the SQLx connection pool which handles thread-safe
//! connection management.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::{Span, instrument};

use tradepost_core::{CustomerId, OrderError, OrderId, OrderLineId, OrderResult, ProductId};
use tradepost_inventory::Product;
use tradepost_orders::{AddItem, AddedItem, Order, OrderLine, OrderStatus, merge_line};

/// `SET LOCAL` does not accept bind parameters, so the timeout is a constant.
/// It applies per transaction and resets on commit or rollback.
const SET_LOCK_TIMEOUT: &str = "SET LOCAL lock_timeout = '5s'";

const SQLSTATE_LOCK_NOT_AVAILABLE: &str = "55P03";
const SQLSTATE_FOREIGN_KEY_VIOLATION: &str = "23503";

/// Postgres-backed store for orders, order lines, and product stock.
///
/// Constructed once at startup from the shared pool and handed to every
/// handler; nothing here holds global state beyond the pool itself.
#[derive(Debug, Clone)]
pub struct OrderStore {
    pub(crate) pool: PgPool,
}

impl OrderStore {
    /// Create a new OrderStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a product to an order, merging with the existing line for the
    /// pair when one exists.
    ///
    /// The whole mutation runs in one transaction:
    /// 1. Lock the order, the product, and any existing line (fixed order)
    /// 2. Gate on the order's status
    /// 3. Check the requested quantity against the locked stock
    /// 4. Insert or update the line, then write the decremented stock
    /// 5. Commit
    ///
    /// Any failure after `begin` rolls the transaction back, so no partial
    /// write ever becomes visible.
    #[instrument(
        skip(self),
        fields(
            order_id = %cmd.order_id,
            product_id = %cmd.product_id,
            quantity = cmd.quantity
        ),
        err
    )]
    pub async fn add_item(&self, cmd: AddItem) -> OrderResult<AddedItem> {
        let span = Span::current();
        span.record("operation", "add_item");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        match run_add_item(&mut tx, cmd).await {
            Ok(added) => {
                tx.commit()
                    .await
                    .map_err(|e| map_sqlx_error("commit_transaction", e))?;
                span.record("action", added.action.as_str());
                Ok(added)
            }
            Err(err) => {
                // The original failure is what the caller needs to see; a
                // failed rollback is only logged.
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed after add_item error");
                }
                Err(err)
            }
        }
    }

    /// Create an empty order for a customer. New orders start in `new`.
    #[instrument(skip(self), fields(customer_id = %customer_id), err)]
    pub async fn create_order(&self, customer_id: CustomerId) -> OrderResult<Order> {
        let span = Span::current();
        span.record("operation", "create_order");

        let row = sqlx::query(
            r#"
            INSERT INTO orders (customer_id, current_status)
            VALUES ($1, 'new')
            RETURNING id, customer_id, current_status, created_at
            "#,
        )
        .bind(customer_id.as_i64())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                OrderError::customer_not_found(customer_id)
            } else {
                map_sqlx_error("create_order", e)
            }
        })?;

        OrderRow::from_row(&row)
            .map_err(|e| map_decode_error("create_order", e))?
            .into_order()
    }

    /// Set an order's status.
    ///
    /// Transitions between known statuses are not restricted; the status
    /// only gates line mutation, which [`OrderStore::add_item`] checks under
    /// its own lock.
    #[instrument(skip(self), fields(order_id = %order_id, status = status.as_str()), err)]
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> OrderResult<Order> {
        let span = Span::current();
        span.record("operation", "update_order_status");

        let row = sqlx::query(
            r#"
            UPDATE orders
            SET current_status = $2
            WHERE id = $1
            RETURNING id, customer_id, current_status, created_at
            "#,
        )
        .bind(order_id.as_i64())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_order_status", e))?;

        match row {
            Some(row) => OrderRow::from_row(&row)
                .map_err(|e| map_decode_error("update_order_status", e))?
                .into_order(),
            None => Err(OrderError::order_not_found(order_id)),
        }
    }

    /// Connectivity probe for the health endpoint.
    pub async fn health(&self) -> OrderResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("health", e))?;
        Ok(())
    }
}

/// Body of the add-item transaction. Every `?` here unwinds to the rollback
/// arm in [`OrderStore::add_item`].
async fn run_add_item(
    tx: &mut Transaction<'_, Postgres>,
    cmd: AddItem,
) -> OrderResult<AddedItem> {
    set_lock_timeout(tx).await?;

    let records = lock_for_mutation(tx, cmd.order_id, cmd.product_id).await?;

    records.order.ensure_mutable()?;
    records.product.ensure_available(cmd.quantity)?;

    let merge = merge_line(records.existing_line.as_ref(), cmd.quantity, records.product.price);
    match &records.existing_line {
        None => {
            insert_order_line(tx, cmd.order_id, cmd.product_id, merge.quantity, merge.unit_price)
                .await?
        }
        Some(line) => update_order_line_quantity(tx, line.id, merge.quantity).await?,
    }

    let remaining = records.product.decremented(cmd.quantity)?;
    write_stock_quantity(tx, cmd.product_id, remaining).await?;

    Ok(AddedItem {
        action: merge.action,
        order_id: cmd.order_id,
        product_id: cmd.product_id,
        final_quantity: merge.quantity,
        product_name: records.product.name,
        price_per_unit: merge.unit_price,
    })
}

/// Rows pinned by `FOR UPDATE` for the rest of the transaction.
struct LockedRecords {
    order: Order,
    product: Product,
    existing_line: Option<OrderLine>,
}

/// Acquire every row the mutation touches, always order first, then product,
/// then line. Two transactions contending for the same rows queue on the
/// first lock instead of deadlocking on each other.
async fn lock_for_mutation(
    tx: &mut Transaction<'_, Postgres>,
    order_id: OrderId,
    product_id: ProductId,
) -> OrderResult<LockedRecords> {
    let order = lock_order(tx, order_id).await?;
    let product = lock_product(tx, product_id).await?;
    let existing_line = lock_order_line(tx, order_id, product_id).await?;

    Ok(LockedRecords { order, product, existing_line })
}

async fn set_lock_timeout(tx: &mut Transaction<'_, Postgres>) -> OrderResult<()> {
    sqlx::query(SET_LOCK_TIMEOUT)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("set_lock_timeout", e))?;
    Ok(())
}

async fn lock_order(tx: &mut Transaction<'_, Postgres>, order_id: OrderId) -> OrderResult<Order> {
    let row = sqlx::query(
        r#"
        SELECT id, customer_id, current_status, created_at
        FROM orders
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(order_id.as_i64())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("lock_order", e))?;

    match row {
        Some(row) => OrderRow::from_row(&row)
            .map_err(|e| map_decode_error("lock_order", e))?
            .into_order(),
        None => Err(OrderError::order_not_found(order_id)),
    }
}

async fn lock_product(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
) -> OrderResult<Product> {
    let row = sqlx::query(
        r#"
        SELECT id, name, price, quantity
        FROM products
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(product_id.as_i64())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("lock_product", e))?;

    match row {
        Some(row) => Ok(ProductRow::from_row(&row)
            .map_err(|e| map_decode_error("lock_product", e))?
            .into()),
        None => Err(OrderError::product_not_found(product_id)),
    }
}

/// A missing line is not an error: it means the add will create one.
async fn lock_order_line(
    tx: &mut Transaction<'_, Postgres>,
    order_id: OrderId,
    product_id: ProductId,
) -> OrderResult<Option<OrderLine>> {
    let row = sqlx::query(
        r#"
        SELECT id, order_id, product_id, quantity, price
        FROM order_items
        WHERE order_id = $1 AND product_id = $2
        FOR UPDATE
        "#,
    )
    .bind(order_id.as_i64())
    .bind(product_id.as_i64())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("lock_order_line", e))?;

    match row {
        Some(row) => Ok(Some(
            OrderLineRow::from_row(&row)
                .map_err(|e| map_decode_error("lock_order_line", e))?
                .into(),
        )),
        None => Ok(None),
    }
}

async fn insert_order_line(
    tx: &mut Transaction<'_, Postgres>,
    order_id: OrderId,
    product_id: ProductId,
    quantity: i64,
    unit_price: Decimal,
) -> OrderResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_items (order_id, product_id, quantity, price)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(order_id.as_i64())
    .bind(product_id.as_i64())
    .bind(quantity)
    .bind(unit_price)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_order_line", e))?;

    Ok(())
}

/// The merged quantity replaces the stored one; the line's captured price
/// column is never touched.
async fn update_order_line_quantity(
    tx: &mut Transaction<'_, Postgres>,
    line_id: OrderLineId,
    quantity: i64,
) -> OrderResult<()> {
    sqlx::query("UPDATE order_items SET quantity = $2 WHERE id = $1")
        .bind(line_id.as_i64())
        .bind(quantity)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("update_order_line", e))?;

    Ok(())
}

/// Write the already-checked remaining quantity. The product row is held
/// under `FOR UPDATE`, so a value computed from it cannot be stale.
async fn write_stock_quantity(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    remaining: i64,
) -> OrderResult<()> {
    sqlx::query("UPDATE products SET quantity = $2 WHERE id = $1")
        .bind(product_id.as_i64())
        .bind(remaining)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("write_stock_quantity", e))?;

    Ok(())
}

/// Map SQLx errors to `OrderError`, logging driver detail at this boundary.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> OrderError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.to_string()).unwrap_or_default();
            if code == SQLSTATE_LOCK_NOT_AVAILABLE {
                tracing::warn!(operation, %code, detail = %db_err.message(), "row lock wait timed out");
                return OrderError::LockTimeout;
            }
            // 23505/23503/23514 land here too: the in-transaction checks are
            // supposed to fire before any constraint does.
            tracing::error!(operation, %code, detail = %db_err.message(), "database error");
            OrderError::storage(operation)
        }
        sqlx::Error::PoolClosed => {
            tracing::error!(operation, "connection pool closed");
            OrderError::storage(operation)
        }
        sqlx::Error::RowNotFound => {
            tracing::error!(operation, "unexpected empty result");
            OrderError::storage(operation)
        }
        other => {
            tracing::error!(operation, detail = %other, "sqlx error");
            OrderError::storage(operation)
        }
    }
}

fn map_decode_error(operation: &str, err: sqlx::Error) -> OrderError {
    tracing::error!(operation, detail = %err, "failed to decode row");
    OrderError::storage(operation)
}

/// Check if an error is a foreign key violation.
fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == SQLSTATE_FOREIGN_KEY_VIOLATION;
        }
    }
    false
}

// SQLx row types

#[derive(Debug)]
pub(crate) struct OrderRow {
    id: i64,
    customer_id: i64,
    current_status: String,
    created_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for OrderRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(OrderRow {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            current_status: row.try_get("current_status")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl OrderRow {
    /// A status outside the known set means the row was written around the
    /// application; surface it as a storage failure, not bad input.
    pub(crate) fn into_order(self) -> OrderResult<Order> {
        let status = self.current_status.parse::<OrderStatus>().map_err(|_| {
            tracing::error!(order_id = self.id, status = %self.current_status, "order row carries an unknown status");
            OrderError::storage("decode_order_row")
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            customer_id: CustomerId::new(self.customer_id),
            status,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug)]
struct ProductRow {
    id: i64,
    name: String,
    price: Decimal,
    quantity: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for ProductRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            quantity: row.try_get("quantity")?,
        })
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::new(row.id),
            name: row.name,
            price: row.price,
            stock_quantity: row.quantity,
        }
    }
}

#[derive(Debug)]
struct OrderLineRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    quantity: i64,
    price: Decimal,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for OrderLineRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(OrderLineRow {
            id: row.try_get("id")?,
            order_id: row.try_get("order_id")?,
            product_id: row.try_get("product_id")?,
            quantity: row.try_get("quantity")?,
            price: row.try_get("price")?,
        })
    }
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        OrderLine {
            id: OrderLineId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            unit_price: row.price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_non_database_errors_to_opaque_storage_failures() {
        let err = map_sqlx_error("lock_order", sqlx::Error::RowNotFound);
        assert_eq!(err, OrderError::storage("lock_order"));

        let err = map_sqlx_error("health", sqlx::Error::PoolClosed);
        assert_eq!(err, OrderError::storage("health"));
    }

    #[test]
    fn foreign_key_probe_ignores_non_database_errors() {
        assert!(!is_foreign_key_violation(&sqlx::Error::RowNotFound));
    }
}
