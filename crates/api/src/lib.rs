//! HTTP surface: axum router, request/response DTOs, and error mapping.

pub mod app;
