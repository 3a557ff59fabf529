//! Adapters - Implementations of the port traits.
//!
//! - `postgres` - sqlx-backed persistence
//! - `memory` - in-process store for tests and local development
//! - `email` - Resend-backed settlement notification
//! - `http` - Axum routes, handlers, and DTOs

pub mod email;
pub mod http;
pub mod memory;
pub mod postgres;
