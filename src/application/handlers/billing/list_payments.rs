//! ListPaymentsHandler - Query handler for a member's payment history.

use std::sync::Arc;

use crate::domain::billing::{BillingError, PaymentRecord};
use crate::domain::foundation::MemberId;
use crate::ports::BillingStore;

/// Query for a member's ledger records, most recent first. Without a
/// limit the whole ledger is listed.
#[derive(Debug, Clone)]
pub struct ListPaymentsQuery {
    pub member_id: MemberId,
    pub limit: Option<u32>,
}

/// Handler reading the payment ledger.
pub struct ListPaymentsHandler {
    store: Arc<dyn BillingStore>,
}

impl ListPaymentsHandler {
    pub fn new(store: Arc<dyn BillingStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: ListPaymentsQuery) -> Result<Vec<PaymentRecord>, BillingError> {
        self.store
            .payments_for_member(query.member_id, query.limit)
            .await
    }
}
