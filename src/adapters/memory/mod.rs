//! In-memory implementation of the store ports.
//!
//! Backs integration tests and local development without a database. One
//! mutex guards all state, which makes every operation transactional by
//! construction; the semantics mirror the PostgreSQL adapters, including
//! the one-ledger-row-per-invoice rule.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::billing::{
    BillingError, Invoice, PaymentMethod, PaymentRecord, Settlement, SettlementOutcome,
};
use crate::domain::foundation::{InvoiceId, MemberId, MembershipId, Money, PackageId};
use crate::domain::membership::{Membership, MembershipPackage};
use crate::ports::{BillingStore, MemberDirectory, MembershipReader, PackageCatalog};

#[derive(Default)]
struct State {
    packages: Vec<MembershipPackage>,
    memberships: HashMap<MembershipId, Membership>,
    invoices: HashMap<InvoiceId, Invoice>,
    ledger: Vec<PaymentRecord>,
    emails: HashMap<MemberId, String>,
}

/// In-memory store implementing all billing-side ports.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with the standard package catalog.
    pub fn with_default_catalog() -> Self {
        let store = Self::new();
        {
            let mut state = store.state.lock().expect("store mutex poisoned");
            state.packages = vec![
                MembershipPackage::new("GÓI 1 THÁNG", 1, Money::vnd(500_000)),
                MembershipPackage::new("GÓI 3 THÁNG", 3, Money::vnd(1_200_000)),
                MembershipPackage::new("GÓI 6 THÁNG", 6, Money::vnd(2_000_000)),
                MembershipPackage::new("GÓI 12 THÁNG", 12, Money::vnd(3_500_000)),
            ];
        }
        store
    }

    pub fn add_package(&self, package: MembershipPackage) {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .packages
            .push(package);
    }

    pub fn register_email(&self, member_id: MemberId, email: impl Into<String>) {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .emails
            .insert(member_id, email.into());
    }

    /// Snapshot of the payment ledger, for assertions.
    pub fn ledger(&self) -> Vec<PaymentRecord> {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .ledger
            .clone()
    }
}

#[async_trait]
impl BillingStore for InMemoryStore {
    async fn create_purchase(
        &self,
        membership: &Membership,
        invoice: &Invoice,
    ) -> Result<(), BillingError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        state.memberships.insert(membership.id, membership.clone());
        state.invoices.insert(invoice.id, invoice.clone());
        Ok(())
    }

    async fn find_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, BillingError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.invoices.get(&id).cloned())
    }

    async fn settle_invoice(
        &self,
        id: InvoiceId,
        presented: Money,
        method: PaymentMethod,
    ) -> Result<Settlement, BillingError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        let invoice = state
            .invoices
            .get_mut(&id)
            .ok_or(BillingError::InvoiceNotFound(id))?;

        let outcome = invoice.settle(presented)?;
        let invoice = invoice.clone();

        if outcome == SettlementOutcome::Applied {
            if let Some(membership) = state.memberships.get_mut(&invoice.membership_id) {
                membership.activate();
            }
            state
                .ledger
                .push(PaymentRecord::new(id, presented, method));
        }

        Ok(Settlement { invoice, outcome })
    }

    async fn payment_for_invoice(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Option<PaymentRecord>, BillingError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .ledger
            .iter()
            .find(|r| r.invoice_id == invoice_id)
            .cloned())
    }

    async fn payments_for_member(
        &self,
        member_id: MemberId,
        limit: Option<u32>,
    ) -> Result<Vec<PaymentRecord>, BillingError> {
        let state = self.state.lock().expect("store mutex poisoned");
        let mut records: Vec<PaymentRecord> = state
            .ledger
            .iter()
            .filter(|r| {
                state
                    .invoices
                    .get(&r.invoice_id)
                    .is_some_and(|i| i.member_id == member_id)
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| b.paid_at.cmp(&a.paid_at));
        if let Some(limit) = limit {
            records.truncate(limit as usize);
        }
        Ok(records)
    }
}

#[async_trait]
impl MembershipReader for InMemoryStore {
    async fn current_for_member(
        &self,
        member_id: MemberId,
        today: NaiveDate,
    ) -> Result<Option<Membership>, BillingError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .memberships
            .values()
            .filter(|m| m.member_id == member_id && m.is_current(today))
            .max_by_key(|m| m.end_date)
            .cloned())
    }
}

#[async_trait]
impl PackageCatalog for InMemoryStore {
    async fn active_package(
        &self,
        id: PackageId,
    ) -> Result<Option<MembershipPackage>, BillingError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .packages
            .iter()
            .find(|p| p.id == id && p.active)
            .cloned())
    }

    async fn list_active(&self) -> Result<Vec<MembershipPackage>, BillingError> {
        let state = self.state.lock().expect("store mutex poisoned");
        let mut packages: Vec<MembershipPackage> = state
            .packages
            .iter()
            .filter(|p| p.active)
            .cloned()
            .collect();
        packages.sort_by_key(|p| p.duration_months);
        Ok(packages)
    }
}

#[async_trait]
impl MemberDirectory for InMemoryStore {
    async fn email_for(&self, member_id: MemberId) -> Result<Option<String>, BillingError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.emails.get(&member_id).cloned())
    }
}
