//! Member directory port.
//!
//! Minimal read access to member contact details. Member accounts are
//! managed elsewhere; billing only ever needs an email address to confirm
//! a settlement.

use async_trait::async_trait;

use crate::domain::billing::BillingError;
use crate::domain::foundation::MemberId;

/// Read port for member contact lookup.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// The member's email address, if one is on file.
    async fn email_for(&self, member_id: MemberId) -> Result<Option<String>, BillingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_directory_is_object_safe() {
        fn _accepts_dyn(_directory: &dyn MemberDirectory) {}
    }
}
