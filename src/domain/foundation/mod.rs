//! Foundation layer - shared value objects and error types.
//!
//! These types are used across every domain module and carry no behavior
//! beyond validation and formatting.

mod errors;
mod ids;
mod money;

pub use errors::{DomainError, ErrorCode};
pub use ids::{InvoiceId, MemberId, MembershipId, PackageId};
pub use money::Money;
