//! Inventory domain module.
//!
//! This crate contains business rules for product stock, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage): the
//! availability check and the never-negative decrement.

pub mod product;

pub use product::Product;
