use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradepost_core::{OrderId, OrderLineId, ProductId};

/// Order line: product, quantity, unit price captured at add-time.
///
/// At most one line exists per (order, product) pair; a repeat add for the
/// pair merges into the existing line instead of inserting a second row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    /// True per-unit price. A line never stores price × quantity.
    pub unit_price: Decimal,
}

/// Whether an add created a new line or merged into an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineAction {
    Created,
    Updated,
}

impl LineAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineAction::Created => "created",
            LineAction::Updated => "updated",
        }
    }
}

/// Outcome of merging a requested quantity into the line state for one
/// (order, product) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMerge {
    pub action: LineAction,
    pub quantity: i64,
    pub unit_price: Decimal,
}

/// Decide create-vs-merge for an add of `requested_quantity`.
///
/// A new line captures `current_unit_price` from the product; an existing
/// line keeps the price captured when it was first created and is never
/// re-priced on merge.
pub fn merge_line(
    existing: Option<&OrderLine>,
    requested_quantity: i64,
    current_unit_price: Decimal,
) -> LineMerge {
    match existing {
        None => LineMerge {
            action: LineAction::Created,
            quantity: requested_quantity,
            unit_price: current_unit_price,
        },
        Some(line) => LineMerge {
            action: LineAction::Updated,
            quantity: line.quantity + requested_quantity,
            unit_price: line.unit_price,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_line(quantity: i64, unit_price: Decimal) -> OrderLine {
        OrderLine {
            id: OrderLineId::new(11),
            order_id: OrderId::new(1),
            product_id: ProductId::new(7),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn first_add_creates_line_at_current_price() {
        let merge = merge_line(None, 3, Decimal::new(1999, 2));
        assert_eq!(merge.action, LineAction::Created);
        assert_eq!(merge.quantity, 3);
        assert_eq!(merge.unit_price, Decimal::new(1999, 2));
    }

    #[test]
    fn repeat_add_merges_quantities() {
        let existing = test_line(3, Decimal::new(1999, 2));
        let merge = merge_line(Some(&existing), 2, Decimal::new(1999, 2));
        assert_eq!(merge.action, LineAction::Updated);
        assert_eq!(merge.quantity, 5);
    }

    #[test]
    fn merge_keeps_originally_captured_price() {
        // Product was re-priced between the two adds; the line keeps the
        // price from its first add.
        let existing = test_line(3, Decimal::new(1999, 2));
        let merge = merge_line(Some(&existing), 2, Decimal::new(2499, 2));
        assert_eq!(merge.unit_price, Decimal::new(1999, 2));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: merging never loses quantity. The resulting line
        /// quantity is exactly the existing quantity plus the request.
        #[test]
        fn merged_quantity_is_exact_sum(
            existing_qty in 1i64..10_000,
            requested in 1i64..10_000,
        ) {
            let existing = test_line(existing_qty, Decimal::new(500, 2));
            let merge = merge_line(Some(&existing), requested, Decimal::new(500, 2));
            prop_assert_eq!(merge.quantity, existing_qty + requested);
        }

        /// Property: the action is `created` exactly when no line exists.
        #[test]
        fn action_reflects_line_existence(
            requested in 1i64..10_000,
            has_existing in proptest::bool::ANY,
        ) {
            let existing = test_line(1, Decimal::ONE);
            let merge = merge_line(
                has_existing.then_some(&existing),
                requested,
                Decimal::ONE,
            );
            if has_existing {
                prop_assert_eq!(merge.action, LineAction::Updated);
            } else {
                prop_assert_eq!(merge.action, LineAction::Created);
            }
        }
    }
}
