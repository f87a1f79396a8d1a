//! Infrastructure layer: Postgres pool, migrations, and the order store.

pub mod config;
pub mod db;
pub mod read_model;
pub mod store;

pub use config::DbConfig;
pub use read_model::{
    DashboardStats, OrderLineDetail, OrderSummary, ProductListing, StatusCount, TopProduct,
};
pub use store::OrderStore;
