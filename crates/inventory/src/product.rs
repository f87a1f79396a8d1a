use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradepost_core::{OrderError, OrderResult, ProductId};

/// Product as read (and locked) from the `products` table.
///
/// `stock_quantity` is never negative; it is mutated only through the
/// checked decrement below, inside the same atomic unit that updates the
/// order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Non-negative unit price; captured onto a line at first add.
    pub price: Decimal,
    pub stock_quantity: i64,
}

impl Product {
    /// Availability check for an add of `requested` units.
    ///
    /// Stock as read under lock already reflects every committed decrement,
    /// including ones made for the same order/product pair by earlier calls.
    /// The request is therefore compared against stock alone. Comparing
    /// against a merged line total would double-count quantity whose stock
    /// was already debited, rejecting valid requests.
    pub fn ensure_available(&self, requested: i64) -> OrderResult<()> {
        if requested > self.stock_quantity {
            return Err(OrderError::insufficient_stock(
                requested,
                self.stock_quantity,
            ));
        }
        Ok(())
    }

    /// Stock level after removing `quantity` units.
    ///
    /// Fails rather than going negative. With `ensure_available` evaluated
    /// under the same lock this cannot trigger; it backstops the invariant
    /// regardless.
    pub fn decremented(&self, quantity: i64) -> OrderResult<i64> {
        let remaining = self.stock_quantity - quantity;
        if remaining < 0 {
            return Err(OrderError::insufficient_stock(
                quantity,
                self.stock_quantity,
            ));
        }
        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_product(stock_quantity: i64) -> Product {
        Product {
            id: ProductId::new(7),
            name: "Widget".to_string(),
            price: Decimal::new(1999, 2),
            stock_quantity,
        }
    }

    #[test]
    fn request_within_stock_is_available() {
        assert!(test_product(10).ensure_available(3).is_ok());
    }

    #[test]
    fn request_for_entire_stock_is_available() {
        assert!(test_product(5).ensure_available(5).is_ok());
    }

    #[test]
    fn rejects_request_exceeding_stock_with_both_quantities() {
        let err = test_product(5).ensure_available(10).unwrap_err();
        match err {
            OrderError::InsufficientStock {
                requested,
                available,
            } => {
                assert_eq!(requested, 10);
                assert_eq!(available, 5);
            }
            _ => panic!("Expected InsufficientStock"),
        }
    }

    #[test]
    fn availability_is_judged_against_the_request_alone() {
        // Stock 5 after an earlier add already debited 4 units. A further
        // request for 5 fits exactly; only a check that wrongly re-counted
        // the earlier 4 against today's stock would reject it.
        assert!(test_product(5).ensure_available(5).is_ok());
    }

    #[test]
    fn decrement_computes_remaining_stock() {
        assert_eq!(test_product(10).decremented(3).unwrap(), 7);
    }

    #[test]
    fn decrement_may_reach_exactly_zero() {
        assert_eq!(test_product(4).decremented(4).unwrap(), 0);
    }

    #[test]
    fn decrement_never_goes_negative() {
        let err = test_product(4).decremented(5).unwrap_err();
        assert!(matches!(err, OrderError::InsufficientStock { .. }));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: over any sequence of adds that pass the availability
        /// check, stock equals the initial level minus the sum of applied
        /// quantities and never goes negative.
        #[test]
        fn stock_is_conserved_across_applied_adds(
            initial in 0i64..10_000,
            requests in prop::collection::vec(1i64..500, 0..20),
        ) {
            let mut product = test_product(initial);
            let mut applied: i64 = 0;

            for requested in requests {
                if product.ensure_available(requested).is_ok() {
                    product.stock_quantity = product.decremented(requested).unwrap();
                    applied += requested;
                }
            }

            prop_assert_eq!(product.stock_quantity, initial - applied);
            prop_assert!(product.stock_quantity >= 0);
        }

        /// Property: the availability check and the decrement agree. A
        /// request that passes the check always decrements cleanly.
        #[test]
        fn check_and_decrement_agree(
            stock in 0i64..10_000,
            requested in 1i64..10_000,
        ) {
            let product = test_product(stock);
            match product.ensure_available(requested) {
                Ok(()) => {
                    let remaining = product.decremented(requested).unwrap();
                    prop_assert_eq!(remaining, stock - requested);
                }
                Err(OrderError::InsufficientStock { requested: r, available }) => {
                    prop_assert_eq!(r, requested);
                    prop_assert_eq!(available, stock);
                    prop_assert!(requested > stock);
                }
                Err(other) => {
                    return Err(proptest::test_runner::TestCaseError::fail(format!(
                        "unexpected error: {other:?}"
                    )));
                }
            }
        }
    }
}
