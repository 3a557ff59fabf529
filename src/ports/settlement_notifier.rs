//! Settlement notifier port.
//!
//! Fire-and-forget notification after an invoice settles. Delivery failure
//! must never roll back or fail the settlement itself, so the trait is
//! infallible from the caller's point of view; implementations log their
//! own errors.

use async_trait::async_trait;

use crate::domain::billing::Invoice;

/// Notification port invoked after a first-time settlement.
#[async_trait]
pub trait SettlementNotifier: Send + Sync {
    /// Tell the member their payment was received.
    ///
    /// Called once per invoice, only on the `Applied` outcome. Never on
    /// duplicate confirmations.
    async fn settlement_confirmed(&self, invoice: &Invoice);
}
