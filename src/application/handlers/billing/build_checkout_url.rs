//! BuildCheckoutUrlHandler - Query handler producing the signed gateway
//! redirect URL for an unpaid invoice.

use std::sync::Arc;

use chrono::{FixedOffset, Utc};

use crate::domain::billing::BillingError;
use crate::domain::foundation::InvoiceId;
use crate::domain::vnpay::{ParamSet, VnpaySigner};
use crate::ports::BillingStore;

/// The gateway timestamps requests in Vietnam local time (UTC+7).
const VN_UTC_OFFSET_SECS: i32 = 7 * 3600;

/// Command to build a checkout redirect for an invoice.
#[derive(Debug, Clone)]
pub struct BuildCheckoutUrlCommand {
    pub invoice_id: InvoiceId,
    /// Client IP forwarded to the gateway for its risk checks.
    pub client_ip: String,
    /// Free-text order description shown on the gateway's payment page.
    /// Defaults to a reference to the invoice.
    pub order_info: Option<String>,
}

/// Handler assembling and signing the gateway payment request.
pub struct BuildCheckoutUrlHandler {
    store: Arc<dyn BillingStore>,
    signer: VnpaySigner,
    tmn_code: String,
    gateway_url: String,
    return_url: String,
}

impl BuildCheckoutUrlHandler {
    pub fn new(
        store: Arc<dyn BillingStore>,
        signer: VnpaySigner,
        tmn_code: impl Into<String>,
        gateway_url: impl Into<String>,
        return_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            signer,
            tmn_code: tmn_code.into(),
            gateway_url: gateway_url.into(),
            return_url: return_url.into(),
        }
    }

    pub async fn handle(&self, cmd: BuildCheckoutUrlCommand) -> Result<String, BillingError> {
        let invoice = self
            .store
            .find_invoice(cmd.invoice_id)
            .await?
            .ok_or(BillingError::InvoiceNotFound(cmd.invoice_id))?;

        if invoice.paid {
            return Err(BillingError::validation("invoice is already paid"));
        }

        let order_info = cmd
            .order_info
            .unwrap_or_else(|| format!("Thanh toan hoa don {}", invoice.id));
        let offset = FixedOffset::east_opt(VN_UTC_OFFSET_SECS)
            .expect("fixed +07:00 offset is valid");
        let create_date = Utc::now()
            .with_timezone(&offset)
            .format("%Y%m%d%H%M%S")
            .to_string();

        let mut params = ParamSet::new();
        params.insert("vnp_Version", "2.1.0");
        params.insert("vnp_Command", "pay");
        params.insert("vnp_TmnCode", &self.tmn_code);
        // The gateway counts in minor units: VND x100.
        params.insert("vnp_Amount", invoice.total_amount.minor_units().to_string());
        params.insert("vnp_CurrCode", "VND");
        params.insert("vnp_TxnRef", invoice.id.to_string());
        params.insert("vnp_OrderInfo", order_info);
        params.insert("vnp_OrderType", "billpayment");
        params.insert("vnp_Locale", "vn");
        params.insert("vnp_ReturnUrl", &self.return_url);
        params.insert("vnp_IpAddr", cmd.client_ip);
        params.insert("vnp_CreateDate", create_date);

        Ok(self.signer.payment_url(&self.gateway_url, &params))
    }
}
