//! GetInvoiceHandler - Query handler for an invoice and its settlement
//! state.

use std::sync::Arc;

use crate::domain::billing::{BillingError, Invoice, PaymentRecord};
use crate::domain::foundation::InvoiceId;
use crate::ports::BillingStore;

/// Query for one invoice.
#[derive(Debug, Clone)]
pub struct GetInvoiceQuery {
    pub invoice_id: InvoiceId,
}

/// An invoice together with its ledger record, if it has been settled.
#[derive(Debug, Clone)]
pub struct InvoiceStatus {
    pub invoice: Invoice,
    pub payment: Option<PaymentRecord>,
}

/// Handler reading an invoice and the ledger row backing its `paid` flag.
pub struct GetInvoiceHandler {
    store: Arc<dyn BillingStore>,
}

impl GetInvoiceHandler {
    pub fn new(store: Arc<dyn BillingStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetInvoiceQuery) -> Result<InvoiceStatus, BillingError> {
        let invoice = self
            .store
            .find_invoice(query.invoice_id)
            .await?
            .ok_or(BillingError::InvoiceNotFound(query.invoice_id))?;

        let payment = self.store.payment_for_invoice(query.invoice_id).await?;

        Ok(InvoiceStatus { invoice, payment })
    }
}
