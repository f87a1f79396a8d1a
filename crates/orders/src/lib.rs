//! Orders domain module.
//!
//! This crate contains the business rules of the order-mutation flow,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage): the status gate, the line merge decision, and command
//! validation.

pub mod command;
pub mod customer;
pub mod line;
pub mod order;
pub mod status;

pub use command::{AddItem, AddedItem};
pub use customer::Customer;
pub use line::{LineAction, LineMerge, OrderLine, merge_line};
pub use order::Order;
pub use status::OrderStatus;
