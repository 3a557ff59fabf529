//! HandleGatewayReturnHandler - Command handler for the browser return leg
//! of a gateway payment.
//!
//! The return URL is what the member's browser lands on after paying. It is
//! a convenience channel: the server notification (IPN) carries the same
//! confirmation and either may arrive first. Settlement here is therefore
//! tolerant of duplicates, and the outcome is a display decision rather
//! than a protocol reply.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::billing::{BillingError, Invoice, PaymentMethod, SettlementOutcome};
use crate::domain::vnpay::{GatewayCallback, ParamSet, VnpaySigner};
use crate::ports::{BillingStore, SettlementNotifier};

/// Command carrying the decoded return query parameters.
#[derive(Debug, Clone)]
pub struct HandleGatewayReturnCommand {
    pub params: ParamSet,
}

/// What the member should be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnOutcome {
    /// Payment confirmed; membership is now active.
    Confirmed(Invoice),
    /// Payment was already confirmed earlier (usually by the IPN).
    AlreadyConfirmed(Invoice),
    /// The gateway reported failure or cancellation.
    PaymentFailed { response_code: String },
    /// The callback signature did not verify.
    SignatureInvalid,
    /// The transaction reference matches no invoice.
    UnknownInvoice,
}

/// Handler for the gateway return redirect.
pub struct HandleGatewayReturnHandler {
    store: Arc<dyn BillingStore>,
    signer: VnpaySigner,
    notifier: Arc<dyn SettlementNotifier>,
}

impl HandleGatewayReturnHandler {
    pub fn new(
        store: Arc<dyn BillingStore>,
        signer: VnpaySigner,
        notifier: Arc<dyn SettlementNotifier>,
    ) -> Self {
        Self {
            store,
            signer,
            notifier,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleGatewayReturnCommand,
    ) -> Result<ReturnOutcome, BillingError> {
        // 1. Nothing is trusted before the signature verifies
        if !self.signer.verify(&cmd.params) {
            warn!("gateway return with invalid signature");
            return Ok(ReturnOutcome::SignatureInvalid);
        }

        let callback = GatewayCallback::new(cmd.params);

        // 2. Resolve the invoice behind the transaction reference
        let invoice_id = match callback.invoice_id() {
            Some(id) => id,
            None => return Ok(ReturnOutcome::UnknownInvoice),
        };
        let invoice = match self.store.find_invoice(invoice_id).await? {
            Some(invoice) => invoice,
            None => return Ok(ReturnOutcome::UnknownInvoice),
        };

        // 3. A non-success response code never settles anything
        if !callback.is_success() {
            let response_code = callback.response_code().unwrap_or("").to_string();
            info!(invoice_id = %invoice_id, code = %response_code, "gateway reported failure");
            return Ok(ReturnOutcome::PaymentFailed { response_code });
        }

        // 4. Settle with the invoice's own total. The signed amount was
        //    already authenticated in step 1; the strict amount comparison
        //    belongs to the IPN, which is the channel of record.
        let settlement = self
            .store
            .settle_invoice(invoice_id, invoice.total_amount, PaymentMethod::Vnpay)
            .await?;

        match settlement.outcome {
            SettlementOutcome::Applied => {
                info!(invoice_id = %invoice_id, "invoice settled via gateway return");
                self.notifier.settlement_confirmed(&settlement.invoice).await;
                Ok(ReturnOutcome::Confirmed(settlement.invoice))
            }
            SettlementOutcome::AlreadyPaid => {
                Ok(ReturnOutcome::AlreadyConfirmed(settlement.invoice))
            }
        }
    }
}
