//! Typed access to gateway callback parameters and the IPN reply contract.
//!
//! Both delivery channels (browser return and server-to-server IPN) carry
//! the same parameter shape; only the expected response differs. The IPN
//! endpoint must answer with a small `{RspCode, Message}` object using the
//! gateway's fixed code table.

use serde::Serialize;

use crate::domain::foundation::{InvoiceId, Money};

use super::ParamSet;

/// Gateway response code meaning the payment succeeded.
pub const RESPONSE_CODE_SUCCESS: &str = "00";

/// An inbound callback parameter mapping with typed accessors.
#[derive(Debug, Clone)]
pub struct GatewayCallback {
    params: ParamSet,
}

impl GatewayCallback {
    pub fn new(params: ParamSet) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The transaction reference, i.e. our invoice id.
    pub fn invoice_id(&self) -> Option<InvoiceId> {
        self.params.get("vnp_TxnRef")?.parse().ok()
    }

    /// The paid amount, converted back from gateway minor units.
    ///
    /// `None` for a missing, non-numeric, or fractional-VND value; callers
    /// report those as an amount mismatch rather than crashing.
    pub fn amount(&self) -> Option<Money> {
        let minor: i64 = self.params.get("vnp_Amount")?.parse().ok()?;
        Money::from_minor_units(minor)
    }

    pub fn response_code(&self) -> Option<&str> {
        self.params.get("vnp_ResponseCode")
    }

    /// Whether the gateway reports the payment as successful.
    pub fn is_success(&self) -> bool {
        self.response_code() == Some(RESPONSE_CODE_SUCCESS)
    }
}

/// Outcome of IPN processing, in the gateway's reply vocabulary.
///
/// Checks run in a fixed order - signature, existence, amount, duplicate,
/// response code - and the first failure short-circuits the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyStatus {
    /// Settlement applied.
    Confirmed,
    /// Invoice was already paid; duplicate delivery acknowledged.
    AlreadyConfirmed,
    /// Empty or malformed request.
    InvalidRequest,
    /// Signature verification failed.
    InvalidSignature,
    /// No invoice matches the transaction reference.
    OrderNotFound,
    /// Presented amount differs from the invoice total.
    AmountMismatch,
    /// Gateway reported a failed or cancelled payment.
    PaymentFailed,
}

impl NotifyStatus {
    /// The gateway wire code. `PaymentFailed` shares `01` with
    /// `OrderNotFound`, exactly as the gateway contract specifies.
    pub fn code(&self) -> &'static str {
        match self {
            NotifyStatus::Confirmed => "00",
            NotifyStatus::AlreadyConfirmed => "02",
            NotifyStatus::InvalidRequest => "99",
            NotifyStatus::InvalidSignature => "97",
            NotifyStatus::OrderNotFound => "01",
            NotifyStatus::AmountMismatch => "04",
            NotifyStatus::PaymentFailed => "01",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            NotifyStatus::Confirmed => "Confirm Success",
            NotifyStatus::AlreadyConfirmed => "Order already confirmed",
            NotifyStatus::InvalidRequest => "Invalid request",
            NotifyStatus::InvalidSignature => "Invalid signature",
            NotifyStatus::OrderNotFound => "Order not found",
            NotifyStatus::AmountMismatch => "Invalid amount",
            NotifyStatus::PaymentFailed => "Payment failed",
        }
    }

    pub fn reply(&self) -> NotifyReply {
        NotifyReply {
            rsp_code: self.code(),
            message: self.message(),
        }
    }
}

/// The JSON body returned to the gateway's IPN call.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NotifyReply {
    #[serde(rename = "RspCode")]
    pub rsp_code: &'static str,
    #[serde(rename = "Message")]
    pub message: &'static str,
}
