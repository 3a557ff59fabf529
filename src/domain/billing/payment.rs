//! Append-only payment ledger entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{InvoiceId, Money};

/// How a payment reached us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Online payment through the VNPay gateway.
    Vnpay,
    /// Settled at the front desk by an admin.
    Offline,
    /// Cash at the counter (legacy default).
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Vnpay => "VNPAY",
            PaymentMethod::Offline => "OFFLINE",
            PaymentMethod::Cash => "CASH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "VNPAY" => Some(PaymentMethod::Vnpay),
            "OFFLINE" => Some(PaymentMethod::Offline),
            "CASH" => Some(PaymentMethod::Cash),
            _ => None,
        }
    }
}

/// One row of the payment ledger.
///
/// Written exactly once per successful settlement, never mutated or
/// deleted. At most one record exists per invoice; the store enforces this
/// with a unique constraint on `invoice_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub invoice_id: InvoiceId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub paid_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn new(invoice_id: InvoiceId, amount: Money, method: PaymentMethod) -> Self {
        Self {
            id: Uuid::new_v4(),
            invoice_id,
            amount,
            method,
            paid_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_round_trips_through_str() {
        for method in [PaymentMethod::Vnpay, PaymentMethod::Offline, PaymentMethod::Cash] {
            assert_eq!(PaymentMethod::parse(method.as_str()), Some(method));
        }
    }

    #[test]
    fn method_parse_is_case_insensitive() {
        assert_eq!(PaymentMethod::parse("vnpay"), Some(PaymentMethod::Vnpay));
        assert_eq!(PaymentMethod::parse("bitcoin"), None);
    }

    #[test]
    fn record_captures_invoice_and_amount() {
        let invoice_id = InvoiceId::new();
        let record = PaymentRecord::new(invoice_id, Money::vnd(500_000), PaymentMethod::Vnpay);
        assert_eq!(record.invoice_id, invoice_id);
        assert_eq!(record.amount, Money::vnd(500_000));
    }
}
