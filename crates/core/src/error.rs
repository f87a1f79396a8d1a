//! Domain error model.

use thiserror::Error;

use crate::id::{CustomerId, OrderId, ProductId};

/// Result type used across the order domain.
pub type OrderResult<T> = Result<T, OrderError>;

/// Error kinds surfaced by the order-mutation flow.
///
/// Every kind maps to a stable caller-visible outcome; raw driver errors are
/// translated into `Storage` at the infrastructure boundary and never leak
/// verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Input failed validation before any database interaction.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The referenced order does not exist.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// The referenced product does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The referenced customer does not exist.
    #[error("customer {0} not found")]
    CustomerNotFound(CustomerId),

    /// The order's current status does not permit mutation.
    #[error("order {order_id} cannot be modified in status '{status}'")]
    InvalidState { order_id: OrderId, status: String },

    /// Requested quantity exceeds the stock available under lock.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    /// A row lock could not be acquired within the configured wait window.
    /// Transient; the call is safe to retry.
    #[error("timed out waiting for a row lock")]
    LockTimeout,

    /// Connection or storage failure. Opaque to callers; the driver detail
    /// is logged where the error is translated.
    #[error("storage failure during {operation}")]
    Storage { operation: String },
}

impl OrderError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn order_not_found(order_id: OrderId) -> Self {
        Self::OrderNotFound(order_id)
    }

    pub fn product_not_found(product_id: ProductId) -> Self {
        Self::ProductNotFound(product_id)
    }

    pub fn customer_not_found(customer_id: CustomerId) -> Self {
        Self::CustomerNotFound(customer_id)
    }

    pub fn invalid_state(order_id: OrderId, status: impl Into<String>) -> Self {
        Self::InvalidState {
            order_id,
            status: status.into(),
        }
    }

    pub fn insufficient_stock(requested: i64, available: i64) -> Self {
        Self::InsufficientStock {
            requested,
            available,
        }
    }

    pub fn storage(operation: impl Into<String>) -> Self {
        Self::Storage {
            operation: operation.into(),
        }
    }
}
