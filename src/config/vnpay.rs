//! VNPay gateway configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// VNPay payment gateway configuration.
///
/// The hash secret signs every outbound payment request and verifies every
/// inbound callback. It is injected explicitly into the signer at
/// construction; nothing reads it from ambient state.
#[derive(Debug, Clone, Deserialize)]
pub struct VnpayConfig {
    /// Merchant terminal code issued by VNPay
    pub tmn_code: String,

    /// Shared HMAC secret for request signing
    pub hash_secret: SecretString,

    /// Gateway payment page URL
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// URL the gateway redirects the browser back to
    pub return_url: String,
}

impl VnpayConfig {
    /// Expose the hash secret for signer construction.
    pub fn hash_secret(&self) -> &str {
        self.hash_secret.expose_secret()
    }

    /// Validate VNPay configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.tmn_code.is_empty() {
            return Err(ValidationError::MissingRequired("VNPAY_TMN_CODE"));
        }
        if self.hash_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("VNPAY_HASH_SECRET"));
        }
        if !is_http_url(&self.gateway_url) {
            return Err(ValidationError::InvalidGatewayUrl);
        }
        if !is_http_url(&self.return_url) {
            return Err(ValidationError::InvalidReturnUrl);
        }
        Ok(())
    }
}

impl Default for VnpayConfig {
    fn default() -> Self {
        Self {
            tmn_code: String::new(),
            hash_secret: SecretString::new(String::new()),
            gateway_url: default_gateway_url(),
            return_url: String::new(),
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn default_gateway_url() -> String {
    "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".to_string()
}
