use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradepost_core::{CustomerId, OrderError, OrderId, OrderResult};

use crate::status::OrderStatus;

/// Order header as read (and locked) from the `orders` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn is_mutable(&self) -> bool {
        self.status.is_mutable()
    }

    /// Status gate: evaluated under the order lock, before any inventory
    /// check, so the decision is never based on a stale status.
    pub fn ensure_mutable(&self) -> OrderResult<()> {
        if self.is_mutable() {
            Ok(())
        } else {
            Err(OrderError::invalid_state(self.id, self.status.as_str()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_order(status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(1),
            customer_id: CustomerId::new(7),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn gate_permits_new_and_processing_orders() {
        assert!(test_order(OrderStatus::New).ensure_mutable().is_ok());
        assert!(test_order(OrderStatus::Processing).ensure_mutable().is_ok());
    }

    #[test]
    fn gate_rejects_shipped_order_with_current_status() {
        let err = test_order(OrderStatus::Shipped).ensure_mutable().unwrap_err();
        match err {
            OrderError::InvalidState { order_id, status } => {
                assert_eq!(order_id, OrderId::new(1));
                assert_eq!(status, "shipped");
            }
            _ => panic!("Expected InvalidState for shipped order"),
        }
    }

    #[test]
    fn gate_rejects_delivered_order() {
        let err = test_order(OrderStatus::Delivered)
            .ensure_mutable()
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidState { .. }));
    }
}
