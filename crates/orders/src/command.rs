use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradepost_core::{OrderError, OrderId, OrderResult, ProductId};

use crate::line::LineAction;

/// Command: add a quantity of a product to an order.
///
/// Construction validates the raw request, so a constructed command is safe
/// to hand to the store. Each call is an independent delta-add: submitting
/// the same command twice adds the quantity twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
}

impl AddItem {
    /// Validate raw request values. Violations fail with `InvalidInput`
    /// before any database interaction.
    pub fn new(order_id: i64, product_id: i64, quantity: i64) -> OrderResult<Self> {
        if order_id <= 0 {
            return Err(OrderError::invalid_input(
                "order_id must be a positive integer",
            ));
        }
        if product_id <= 0 {
            return Err(OrderError::invalid_input(
                "product_id must be a positive integer",
            ));
        }
        if quantity <= 0 {
            return Err(OrderError::invalid_input(
                "quantity must be a positive integer",
            ));
        }
        Ok(Self {
            order_id: OrderId::new(order_id),
            product_id: ProductId::new(product_id),
            quantity,
        })
    }
}

/// Outcome of a committed add: the resulting line state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedItem {
    pub action: LineAction,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub final_quantity: i64,
    pub product_name: String,
    pub price_per_unit: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_request() {
        let cmd = AddItem::new(1, 7, 3).unwrap();
        assert_eq!(cmd.order_id, OrderId::new(1));
        assert_eq!(cmd.product_id, ProductId::new(7));
        assert_eq!(cmd.quantity, 3);
    }

    #[test]
    fn rejects_zero_quantity() {
        let err = AddItem::new(1, 7, 0).unwrap_err();
        match err {
            OrderError::InvalidInput(msg) if msg.contains("quantity") => {}
            _ => panic!("Expected InvalidInput for zero quantity"),
        }
    }

    #[test]
    fn rejects_negative_quantity() {
        assert!(matches!(
            AddItem::new(1, 7, -4),
            Err(OrderError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_non_positive_identifiers() {
        assert!(matches!(
            AddItem::new(0, 7, 1),
            Err(OrderError::InvalidInput(_))
        ));
        assert!(matches!(
            AddItem::new(1, -7, 1),
            Err(OrderError::InvalidInput(_))
        ));
    }
}
