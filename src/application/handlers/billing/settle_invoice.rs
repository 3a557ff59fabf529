//! SettleInvoiceHandler - Command handler for direct invoice settlement.
//!
//! Used when payment arrives outside the gateway: cash at the front desk or
//! an admin marking an invoice paid. Gateway callbacks settle through their
//! own handlers.

use std::sync::Arc;

use tracing::info;

use crate::domain::billing::{BillingError, PaymentMethod, Settlement, SettlementOutcome};
use crate::domain::foundation::{InvoiceId, Money};
use crate::ports::{BillingStore, SettlementNotifier};

/// Command to settle an invoice.
#[derive(Debug, Clone)]
pub struct SettleInvoiceCommand {
    pub invoice_id: InvoiceId,
    /// Amount received. `None` means the invoice's own total, which can
    /// never mismatch.
    pub amount: Option<Money>,
    pub method: PaymentMethod,
}

/// Handler applying a settlement and notifying the member on a first-time
/// confirmation.
pub struct SettleInvoiceHandler {
    store: Arc<dyn BillingStore>,
    notifier: Arc<dyn SettlementNotifier>,
}

impl SettleInvoiceHandler {
    pub fn new(store: Arc<dyn BillingStore>, notifier: Arc<dyn SettlementNotifier>) -> Self {
        Self { store, notifier }
    }

    pub async fn handle(&self, cmd: SettleInvoiceCommand) -> Result<Settlement, BillingError> {
        let presented = match cmd.amount {
            Some(amount) => amount,
            None => {
                self.store
                    .find_invoice(cmd.invoice_id)
                    .await?
                    .ok_or(BillingError::InvoiceNotFound(cmd.invoice_id))?
                    .total_amount
            }
        };

        let settlement = self
            .store
            .settle_invoice(cmd.invoice_id, presented, cmd.method)
            .await?;

        if settlement.outcome == SettlementOutcome::Applied {
            info!(
                invoice_id = %cmd.invoice_id,
                amount = %presented,
                method = cmd.method.as_str(),
                "invoice settled"
            );
            self.notifier.settlement_confirmed(&settlement.invoice).await;
        }

        Ok(settlement)
    }
}
