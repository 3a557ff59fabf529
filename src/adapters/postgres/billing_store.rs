//! PostgreSQL implementation of BillingStore.
//!
//! Owns the two transaction boundaries of the billing write model: the
//! atomic purchase insert and the serialized settlement. Settlement locks
//! the invoice row with `SELECT ... FOR UPDATE`, so two confirmations of
//! the same invoice are applied one after the other and the second sees
//! the invoice already paid.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::billing::{
    BillingError, Invoice, PaymentMethod, PaymentRecord, Settlement, SettlementOutcome,
};
use crate::domain::foundation::{DomainError, InvoiceId, MemberId, MembershipId, Money};
use crate::domain::membership::Membership;
use crate::ports::BillingStore;

/// PostgreSQL implementation of the BillingStore port.
pub struct PostgresBillingStore {
    pool: PgPool,
}

impl PostgresBillingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an invoice.
#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: Uuid,
    member_id: Uuid,
    membership_id: Uuid,
    total_amount: i64,
    paid: bool,
    created_at: DateTime<Utc>,
}

impl From<InvoiceRow> for Invoice {
    fn from(row: InvoiceRow) -> Self {
        Invoice {
            id: InvoiceId::from_uuid(row.id),
            member_id: MemberId::from_uuid(row.member_id),
            membership_id: MembershipId::from_uuid(row.membership_id),
            total_amount: Money::vnd(row.total_amount),
            paid: row.paid,
            created_at: row.created_at,
        }
    }
}

/// Database row representation of a payment ledger entry.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    invoice_id: Uuid,
    amount: i64,
    method: String,
    paid_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for PaymentRecord {
    type Error = BillingError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let method = PaymentMethod::parse(&row.method).ok_or_else(|| {
            BillingError::infrastructure(format!("invalid payment method value: {}", row.method))
        })?;
        Ok(PaymentRecord {
            id: row.id,
            invoice_id: InvoiceId::from_uuid(row.invoice_id),
            amount: Money::vnd(row.amount),
            method,
            paid_at: row.paid_at,
        })
    }
}

fn db_err(context: &str, err: sqlx::Error) -> BillingError {
    DomainError::database(format!("{context}: {err}")).into()
}

async fn insert_membership(
    tx: &mut Transaction<'_, Postgres>,
    membership: &Membership,
) -> Result<(), BillingError> {
    sqlx::query(
        r#"
        INSERT INTO memberships (id, member_id, package_id, start_date, end_date, active)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(membership.id.as_uuid())
    .bind(membership.member_id.as_uuid())
    .bind(membership.package_id.as_uuid())
    .bind(membership.start_date)
    .bind(membership.end_date)
    .bind(membership.active)
    .execute(&mut **tx)
    .await
    .map_err(|e| db_err("failed to insert membership", e))?;
    Ok(())
}

async fn insert_invoice(
    tx: &mut Transaction<'_, Postgres>,
    invoice: &Invoice,
) -> Result<(), BillingError> {
    sqlx::query(
        r#"
        INSERT INTO invoices (id, member_id, membership_id, total_amount, paid, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(invoice.id.as_uuid())
    .bind(invoice.member_id.as_uuid())
    .bind(invoice.membership_id.as_uuid())
    .bind(invoice.total_amount.amount())
    .bind(invoice.paid)
    .bind(invoice.created_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| db_err("failed to insert invoice", e))?;
    Ok(())
}

#[async_trait]
impl BillingStore for PostgresBillingStore {
    async fn create_purchase(
        &self,
        membership: &Membership,
        invoice: &Invoice,
    ) -> Result<(), BillingError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("failed to begin purchase transaction", e))?;

        insert_membership(&mut tx, membership).await?;
        insert_invoice(&mut tx, invoice).await?;

        tx.commit()
            .await
            .map_err(|e| db_err("failed to commit purchase", e))?;
        Ok(())
    }

    async fn find_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, BillingError> {
        let row: Option<InvoiceRow> = sqlx::query_as(
            r#"
            SELECT id, member_id, membership_id, total_amount, paid, created_at
            FROM invoices
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("failed to load invoice", e))?;

        Ok(row.map(Invoice::from))
    }

    async fn settle_invoice(
        &self,
        id: InvoiceId,
        presented: Money,
        method: PaymentMethod,
    ) -> Result<Settlement, BillingError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("failed to begin settlement transaction", e))?;

        // Row lock serializes concurrent confirmations of this invoice.
        let row: Option<InvoiceRow> = sqlx::query_as(
            r#"
            SELECT id, member_id, membership_id, total_amount, paid, created_at
            FROM invoices
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_err("failed to lock invoice", e))?;

        let mut invoice: Invoice = row.ok_or(BillingError::InvoiceNotFound(id))?.into();
        let outcome = invoice.settle(presented)?;

        if outcome == SettlementOutcome::Applied {
            sqlx::query("UPDATE invoices SET paid = TRUE WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(|e| db_err("failed to mark invoice paid", e))?;

            sqlx::query("UPDATE memberships SET active = TRUE WHERE id = $1")
                .bind(invoice.membership_id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(|e| db_err("failed to activate membership", e))?;

            let record = PaymentRecord::new(id, presented, method);
            sqlx::query(
                r#"
                INSERT INTO payment_history (id, invoice_id, amount, method, paid_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(record.id)
            .bind(record.invoice_id.as_uuid())
            .bind(record.amount.amount())
            .bind(record.method.as_str())
            .bind(record.paid_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("failed to append payment record", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_err("failed to commit settlement", e))?;

        Ok(Settlement { invoice, outcome })
    }

    async fn payment_for_invoice(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Option<PaymentRecord>, BillingError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, invoice_id, amount, method, paid_at
            FROM payment_history
            WHERE invoice_id = $1
            "#,
        )
        .bind(invoice_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("failed to load payment record", e))?;

        row.map(PaymentRecord::try_from).transpose()
    }

    async fn payments_for_member(
        &self,
        member_id: MemberId,
        limit: Option<u32>,
    ) -> Result<Vec<PaymentRecord>, BillingError> {
        // LIMIT NULL means no limit in PostgreSQL.
        let rows: Vec<PaymentRow> = sqlx::query_as(
            r#"
            SELECT p.id, p.invoice_id, p.amount, p.method, p.paid_at
            FROM payment_history p
            JOIN invoices i ON i.id = p.invoice_id
            WHERE i.member_id = $1
            ORDER BY p.paid_at DESC
            LIMIT $2
            "#,
        )
        .bind(member_id.as_uuid())
        .bind(limit.map(i64::from))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("failed to load payment history", e))?;

        rows.into_iter().map(PaymentRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_row_maps_to_domain() {
        let row = InvoiceRow {
            id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            membership_id: Uuid::new_v4(),
            total_amount: 500_000,
            paid: false,
            created_at: Utc::now(),
        };
        let id = row.id;

        let invoice = Invoice::from(row);
        assert_eq!(invoice.id, InvoiceId::from_uuid(id));
        assert_eq!(invoice.total_amount, Money::vnd(500_000));
        assert!(!invoice.paid);
    }

    #[test]
    fn payment_row_rejects_unknown_method() {
        let row = PaymentRow {
            id: Uuid::new_v4(),
            invoice_id: Uuid::new_v4(),
            amount: 500_000,
            method: "BARTER".to_string(),
            paid_at: Utc::now(),
        };
        assert!(PaymentRecord::try_from(row).is_err());
    }

    #[test]
    fn payment_row_parses_stored_method() {
        let row = PaymentRow {
            id: Uuid::new_v4(),
            invoice_id: Uuid::new_v4(),
            amount: 1_200_000,
            method: "VNPAY".to_string(),
            paid_at: Utc::now(),
        };
        let record = PaymentRecord::try_from(row).unwrap();
        assert_eq!(record.method, PaymentMethod::Vnpay);
        assert_eq!(record.amount, Money::vnd(1_200_000));
    }
}
