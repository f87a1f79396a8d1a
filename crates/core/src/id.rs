//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::OrderError;

/// Identifier of an order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

/// Identifier of a product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

/// Identifier of an order line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderLineId(i64);

/// Identifier of a customer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(i64);

macro_rules! impl_i64_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap a raw database identifier.
            ///
            /// The value is not range-checked here; command validation rejects
            /// non-positive identifiers before any database interaction.
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = OrderError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value: i64 = s
                    .parse()
                    .map_err(|_| OrderError::invalid_input(format!("{} must be an integer", $name)))?;
                if value <= 0 {
                    return Err(OrderError::invalid_input(format!("{} must be positive", $name)));
                }
                Ok(Self(value))
            }
        }
    };
}

impl_i64_newtype!(OrderId, "order id");
impl_i64_newtype!(ProductId, "product id");
impl_i64_newtype!(OrderLineId, "order line id");
impl_i64_newtype!(CustomerId, "customer id");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_id() {
        let id: OrderId = "42".parse().unwrap();
        assert_eq!(id.as_i64(), 42);
    }

    #[test]
    fn rejects_zero_and_negative() {
        assert!("0".parse::<OrderId>().is_err());
        assert!("-5".parse::<ProductId>().is_err());
    }

    #[test]
    fn rejects_non_numeric() {
        assert!("seven".parse::<OrderId>().is_err());
    }
}
