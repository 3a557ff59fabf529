//! Billing-specific error types.
//!
//! Every settlement-layer failure is a typed outcome; nothing is silently
//! swallowed. An already-settled invoice is deliberately NOT an error -
//! duplicate confirmation is a success no-op (see `SettlementOutcome`).

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::foundation::{
    DomainError, ErrorCode, InvoiceId, Money, PackageId,
};

/// Billing and settlement errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    /// No invoice with this id exists.
    #[error("invoice {0} not found")]
    InvoiceNotFound(InvoiceId),

    /// The presented amount does not equal the invoice total.
    #[error("amount mismatch: invoice total {expected}, presented {presented}")]
    AmountMismatch { expected: Money, presented: Money },

    /// The package does not exist or is no longer offered.
    #[error("package {0} unavailable")]
    PackageUnavailable(PackageId),

    /// The member already holds an active, unexpired membership.
    #[error("member already has an active membership until {until}")]
    ActiveMembershipExists { until: NaiveDate },

    /// Callback signature verification failed.
    #[error("gateway signature invalid")]
    SignatureInvalid,

    /// Missing or malformed input.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Persistence or other infrastructure failure.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl BillingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BillingError::ValidationFailed(message.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BillingError::Infrastructure(message.into())
    }
}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => BillingError::ValidationFailed(err.message),
            _ => BillingError::Infrastructure(err.message),
        }
    }
}
