//! Membership reader port (read side).
//!
//! Lookup used before selling a new package: a member with a membership
//! that is active and not yet expired cannot buy another one.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::billing::BillingError;
use crate::domain::foundation::MemberId;
use crate::domain::membership::Membership;

/// Read port for a member's membership state.
#[async_trait]
pub trait MembershipReader: Send + Sync {
    /// The member's membership that is active and ends on or after `today`,
    /// if any.
    ///
    /// Inactive (unpaid) and expired memberships are not returned.
    async fn current_for_member(
        &self,
        member_id: MemberId,
        today: NaiveDate,
    ) -> Result<Option<Membership>, BillingError>;
}
