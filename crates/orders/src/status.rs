use core::str::FromStr;

use serde::{Deserialize, Serialize};

use tradepost_core::OrderError;

/// Order status lifecycle.
///
/// Stored as lowercase text in the `orders.current_status` column; the wire
/// representation matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
        }
    }

    /// Line mutation is permitted only before fulfilment begins.
    pub fn is_mutable(&self) -> bool {
        matches!(self, OrderStatus::New | OrderStatus::Processing)
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(OrderStatus::New),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            other => Err(OrderError::invalid_input(format!(
                "unknown order status '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_and_processing_are_mutable() {
        assert!(OrderStatus::New.is_mutable());
        assert!(OrderStatus::Processing.is_mutable());
    }

    #[test]
    fn shipped_and_delivered_are_not_mutable() {
        assert!(!OrderStatus::Shipped.is_mutable());
        assert!(!OrderStatus::Delivered.is_mutable());
    }

    #[test]
    fn parses_every_stored_representation() {
        for status in [
            OrderStatus::New,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn rejects_unknown_status_text() {
        let err = "cancelled".parse::<OrderStatus>().unwrap_err();
        match err {
            OrderError::InvalidInput(msg) if msg.contains("cancelled") => {}
            _ => panic!("Expected InvalidInput for unknown status"),
        }
    }
}
