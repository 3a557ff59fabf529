//! Billing domain module.
//!
//! Owns the invoice lifecycle (`unpaid -> paid`, exactly once) and the
//! append-only payment ledger written by settlement.

mod errors;
mod invoice;
mod payment;

pub use errors::BillingError;
pub use invoice::{Invoice, Settlement, SettlementOutcome};
pub use payment::{PaymentMethod, PaymentRecord};
