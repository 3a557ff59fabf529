//! HTTP DTOs (Data Transfer Objects) for billing endpoints.
//!
//! These types define the JSON request/response structure for the billing
//! API. They serve as the boundary between HTTP and the application layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::billing::{Invoice, PaymentMethod, PaymentRecord, SettlementOutcome};
use crate::domain::foundation::{MemberId, PackageId};
use crate::domain::membership::{Membership, MembershipPackage};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to sell a package to a member.
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseRequest {
    pub member_id: MemberId,
    pub package_id: PackageId,
    /// Start of the entitlement window; defaults to today.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

/// Request to settle an invoice directly (front desk / admin).
#[derive(Debug, Clone, Deserialize)]
pub struct SettleRequest {
    /// Amount received in whole VND; defaults to the invoice total.
    #[serde(default)]
    pub amount: Option<i64>,
    /// Defaults to CASH.
    #[serde(default)]
    pub method: Option<PaymentMethod>,
}

/// Pagination for payment history.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentHistoryQuery {
    #[serde(default)]
    pub limit: Option<u32>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// A sellable package.
#[derive(Debug, Clone, Serialize)]
pub struct PackageResponse {
    pub id: String,
    pub name: String,
    pub duration_months: u32,
    /// Price in whole VND.
    pub price: i64,
}

impl From<MembershipPackage> for PackageResponse {
    fn from(package: MembershipPackage) -> Self {
        Self {
            id: package.id.to_string(),
            name: package.name,
            duration_months: package.duration_months,
            price: package.price.amount(),
        }
    }
}

/// A membership window.
#[derive(Debug, Clone, Serialize)]
pub struct MembershipResponse {
    pub id: String,
    pub member_id: String,
    pub package_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub active: bool,
}

impl From<Membership> for MembershipResponse {
    fn from(membership: Membership) -> Self {
        Self {
            id: membership.id.to_string(),
            member_id: membership.member_id.to_string(),
            package_id: membership.package_id.to_string(),
            start_date: membership.start_date,
            end_date: membership.end_date,
            active: membership.active,
        }
    }
}

/// An invoice.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceResponse {
    pub id: String,
    pub member_id: String,
    pub membership_id: String,
    /// Total in whole VND.
    pub total_amount: i64,
    pub paid: bool,
    /// ISO 8601.
    pub created_at: String,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id.to_string(),
            member_id: invoice.member_id.to_string(),
            membership_id: invoice.membership_id.to_string(),
            total_amount: invoice.total_amount.amount(),
            paid: invoice.paid,
            created_at: invoice.created_at.to_rfc3339(),
        }
    }
}

/// An invoice and the ledger record backing its `paid` flag.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceStatusResponse {
    pub invoice: InvoiceResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentResponse>,
}

/// Response for a completed purchase.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseResponse {
    pub membership: MembershipResponse,
    pub invoice: InvoiceResponse,
}

/// Response carrying the signed gateway redirect.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
}

/// Response for a direct settlement.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementResponse {
    pub invoice: InvoiceResponse,
    /// `APPLIED` or `ALREADY_PAID`.
    pub outcome: &'static str,
}

impl SettlementResponse {
    pub fn new(invoice: Invoice, outcome: SettlementOutcome) -> Self {
        Self {
            invoice: invoice.into(),
            outcome: match outcome {
                SettlementOutcome::Applied => "APPLIED",
                SettlementOutcome::AlreadyPaid => "ALREADY_PAID",
            },
        }
    }
}

/// One payment ledger entry.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub invoice_id: String,
    /// Amount in whole VND.
    pub amount: i64,
    pub method: &'static str,
    /// ISO 8601.
    pub paid_at: String,
}

impl From<PaymentRecord> for PaymentResponse {
    fn from(record: PaymentRecord) -> Self {
        Self {
            id: record.id.to_string(),
            invoice_id: record.invoice_id.to_string(),
            amount: record.amount.amount(),
            method: record.method.as_str(),
            paid_at: record.paid_at.to_rfc3339(),
        }
    }
}

/// Response shown to the member after the gateway redirects back.
#[derive(Debug, Clone, Serialize)]
pub struct ReturnResponse {
    /// `CONFIRMED`, `ALREADY_CONFIRMED`, `PAYMENT_FAILED`,
    /// `SIGNATURE_INVALID`, or `UNKNOWN_INVOICE`.
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<InvoiceResponse>,
}

/// Standard error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
