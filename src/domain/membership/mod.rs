//! Membership domain module.
//!
//! A membership is a member's entitlement window for one catalog package.
//! It is created inactive alongside its invoice and activated only when
//! that invoice settles.
//!
//! # Module Structure
//!
//! - `package` - MembershipPackage catalog entity
//! - `membership` - Membership entity and month arithmetic

mod membership;
mod package;

pub use membership::{add_months, Membership};
pub use package::MembershipPackage;
