//! `tradepost-core`: shared domain primitives.
//!
//! Typed identifiers and the error vocabulary every other crate builds on.
//! Nothing here touches the database or the network.

pub mod error;
pub mod id;

pub use error::{OrderError, OrderResult};
pub use id::{CustomerId, OrderId, OrderLineId, ProductId};
