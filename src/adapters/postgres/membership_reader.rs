//! PostgreSQL implementation of MembershipReader.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::BillingError;
use crate::domain::foundation::{DomainError, MemberId, MembershipId, PackageId};
use crate::domain::membership::Membership;
use crate::ports::MembershipReader;

/// PostgreSQL implementation of the MembershipReader port.
pub struct PostgresMembershipReader {
    pool: PgPool,
}

impl PostgresMembershipReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    id: Uuid,
    member_id: Uuid,
    package_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    active: bool,
}

impl From<MembershipRow> for Membership {
    fn from(row: MembershipRow) -> Self {
        Membership {
            id: MembershipId::from_uuid(row.id),
            member_id: MemberId::from_uuid(row.member_id),
            package_id: PackageId::from_uuid(row.package_id),
            start_date: row.start_date,
            end_date: row.end_date,
            active: row.active,
        }
    }
}

#[async_trait]
impl MembershipReader for PostgresMembershipReader {
    async fn current_for_member(
        &self,
        member_id: MemberId,
        today: NaiveDate,
    ) -> Result<Option<Membership>, BillingError> {
        let row: Option<MembershipRow> = sqlx::query_as(
            r#"
            SELECT id, member_id, package_id, start_date, end_date, active
            FROM memberships
            WHERE member_id = $1 AND active = TRUE AND end_date >= $2
            ORDER BY end_date DESC
            LIMIT 1
            "#,
        )
        .bind(member_id.as_uuid())
        .bind(today)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            BillingError::from(DomainError::database(format!(
                "failed to load current membership: {e}"
            )))
        })?;

        Ok(row.map(Membership::from))
    }
}
