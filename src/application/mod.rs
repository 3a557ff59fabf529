//! Application layer.
//!
//! Command and query handlers that orchestrate domain objects through the
//! port traits. One file per operation.

pub mod handlers;
