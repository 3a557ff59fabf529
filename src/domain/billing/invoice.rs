//! Invoice aggregate and its settlement state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{InvoiceId, MemberId, MembershipId, Money};

use super::BillingError;

/// A billing record for one package purchase.
///
/// States: `unpaid` (initial) -> `paid` (terminal). The transition happens
/// exactly once; repeated confirmations are no-ops. Invoices are never
/// deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub member_id: MemberId,
    pub membership_id: MembershipId,
    pub total_amount: Money,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

/// How a settlement request was applied to an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// The invoice transitioned `unpaid -> paid`.
    Applied,
    /// The invoice was already paid; nothing changed.
    AlreadyPaid,
}

/// Result of a settlement: the (now paid) invoice plus what happened to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub invoice: Invoice,
    pub outcome: SettlementOutcome,
}

impl Invoice {
    /// Issues a new unpaid invoice for a membership purchase.
    pub fn issue(member_id: MemberId, membership_id: MembershipId, total_amount: Money) -> Self {
        Self {
            id: InvoiceId::new(),
            member_id,
            membership_id,
            total_amount,
            paid: false,
            created_at: Utc::now(),
        }
    }

    /// Applies a settlement to this invoice.
    ///
    /// An already-paid invoice short-circuits to `AlreadyPaid` before any
    /// amount comparison - the gateway may deliver the same confirmation
    /// through both the browser return and the server notification, and the
    /// second delivery must be a harmless no-op.
    ///
    /// # Errors
    ///
    /// `AmountMismatch` when the invoice is unpaid and the presented amount
    /// differs from the invoice total. The invoice is left untouched.
    pub fn settle(&mut self, presented: Money) -> Result<SettlementOutcome, BillingError> {
        if self.paid {
            return Ok(SettlementOutcome::AlreadyPaid);
        }
        if presented != self.total_amount {
            return Err(BillingError::AmountMismatch {
                expected: self.total_amount,
                presented,
            });
        }
        self.paid = true;
        Ok(SettlementOutcome::Applied)
    }
}
