//! HTTP adapters - Axum routing and request handling.

pub mod billing;
