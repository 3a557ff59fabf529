//! Resend implementation of SettlementNotifier.
//!
//! Sends the payment confirmation email through the Resend HTTP API.
//! Delivery is best-effort: a settlement has already committed by the time
//! this runs, so every failure here is logged and swallowed.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::EmailConfig;
use crate::domain::billing::Invoice;
use crate::ports::{MemberDirectory, SettlementNotifier};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Resend-backed implementation of the SettlementNotifier port.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from_header: String,
    directory: Arc<dyn MemberDirectory>,
}

impl ResendMailer {
    pub fn new(config: &EmailConfig, directory: Arc<dyn MemberDirectory>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.resend_api_key.clone(),
            from_header: config.from_header(),
            directory,
        }
    }
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: String,
}

#[async_trait]
impl SettlementNotifier for ResendMailer {
    async fn settlement_confirmed(&self, invoice: &Invoice) {
        let email = match self.directory.email_for(invoice.member_id).await {
            Ok(Some(email)) => email,
            Ok(None) => {
                debug!(member_id = %invoice.member_id, "no email on file, skipping confirmation");
                return;
            }
            Err(err) => {
                error!(member_id = %invoice.member_id, %err, "email lookup failed");
                return;
            }
        };

        let request = SendEmailRequest {
            from: &self.from_header,
            to: [email.as_str()],
            subject: "Thanh toán thành công",
            html: format!(
                "<p>Cảm ơn bạn! Hóa đơn <strong>{}</strong> trị giá \
                 <strong>{}</strong> đã được thanh toán. Gói tập của bạn đã \
                 được kích hoạt.</p>",
                invoice.id, invoice.total_amount
            ),
        };

        let result = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!(invoice_id = %invoice.id, "payment confirmation email sent");
            }
            Ok(response) => {
                error!(
                    invoice_id = %invoice.id,
                    status = %response.status(),
                    "payment confirmation email rejected"
                );
            }
            Err(err) => {
                error!(invoice_id = %invoice.id, %err, "payment confirmation email failed");
            }
        }
    }
}

/// Notifier used when email delivery is disabled.
pub struct NoopNotifier;

#[async_trait]
impl SettlementNotifier for NoopNotifier {
    async fn settlement_confirmed(&self, invoice: &Invoice) {
        debug!(invoice_id = %invoice.id, "email disabled, settlement confirmation not sent");
    }
}
