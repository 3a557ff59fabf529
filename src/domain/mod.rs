//! Domain layer.
//!
//! Pure business types and rules with no I/O. Everything here is
//! synchronous and deterministic; persistence and transport live behind
//! the port traits.

pub mod billing;
pub mod foundation;
pub mod membership;
pub mod vnpay;
