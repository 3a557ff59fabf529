//! Billing store port (write side).
//!
//! Defines the contract for persisting purchases and settling invoices.
//! Implementations own the transaction boundaries; the state transitions
//! themselves are decided by the domain types.
//!
//! # Design
//!
//! - **Atomic purchase**: membership and invoice are written together or
//!   not at all
//! - **Serialized settlement**: `settle_invoice` locks the invoice row so
//!   concurrent confirmations of the same invoice cannot both apply
//! - **Append-only ledger**: at most one `PaymentRecord` per invoice,
//!   enforced with a unique constraint on `invoice_id`
//!
//! # Example
//!
//! ```ignore
//! async fn confirm(
//!     store: &dyn BillingStore,
//!     invoice_id: InvoiceId,
//!     paid: Money,
//! ) -> Result<Settlement, BillingError> {
//!     store
//!         .settle_invoice(invoice_id, paid, PaymentMethod::Vnpay)
//!         .await
//! }
//! ```

use async_trait::async_trait;

use crate::domain::billing::{
    BillingError, Invoice, PaymentMethod, PaymentRecord, Settlement,
};
use crate::domain::foundation::{InvoiceId, MemberId, Money};
use crate::domain::membership::Membership;

/// Persistence port for the billing write model.
#[async_trait]
pub trait BillingStore: Send + Sync {
    /// Persist a new purchase: the membership and its unpaid invoice, in a
    /// single transaction.
    ///
    /// # Errors
    ///
    /// - `Infrastructure` on persistence failure; neither row is written
    async fn create_purchase(
        &self,
        membership: &Membership,
        invoice: &Invoice,
    ) -> Result<(), BillingError>;

    /// Find an invoice by id.
    ///
    /// Returns `None` if no invoice carries this id.
    async fn find_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, BillingError>;

    /// Settle an invoice with the presented amount.
    ///
    /// Loads the invoice under a row lock, runs the settlement state
    /// machine, and on a first-time confirmation marks the invoice paid,
    /// activates its membership, and appends one ledger record, all in the
    /// same transaction. A repeat settlement returns
    /// `SettlementOutcome::AlreadyPaid` and writes nothing.
    ///
    /// # Errors
    ///
    /// - `InvoiceNotFound` if no invoice carries this id
    /// - `AmountMismatch` if the presented amount differs from the invoice
    ///   total; the invoice is left untouched
    /// - `Infrastructure` on persistence failure
    async fn settle_invoice(
        &self,
        id: InvoiceId,
        presented: Money,
        method: PaymentMethod,
    ) -> Result<Settlement, BillingError>;

    /// Ledger record for an invoice, if it has been settled.
    async fn payment_for_invoice(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Option<PaymentRecord>, BillingError>;

    /// A member's ledger records, most recent first. `None` lists the
    /// whole ledger.
    async fn payments_for_member(
        &self,
        member_id: MemberId,
        limit: Option<u32>,
    ) -> Result<Vec<PaymentRecord>, BillingError>;
}
