//! PostgreSQL implementation of PackageCatalog.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::BillingError;
use crate::domain::foundation::{DomainError, Money, PackageId};
use crate::domain::membership::MembershipPackage;
use crate::ports::PackageCatalog;

/// PostgreSQL implementation of the PackageCatalog port.
pub struct PostgresPackageCatalog {
    pool: PgPool,
}

impl PostgresPackageCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PackageRow {
    id: Uuid,
    name: String,
    duration_months: i32,
    price: i64,
    active: bool,
}

impl TryFrom<PackageRow> for MembershipPackage {
    type Error = BillingError;

    fn try_from(row: PackageRow) -> Result<Self, Self::Error> {
        let duration_months = u32::try_from(row.duration_months).map_err(|_| {
            BillingError::infrastructure(format!(
                "invalid package duration: {}",
                row.duration_months
            ))
        })?;
        Ok(MembershipPackage {
            id: PackageId::from_uuid(row.id),
            name: row.name,
            duration_months,
            price: Money::vnd(row.price),
            active: row.active,
        })
    }
}

#[async_trait]
impl PackageCatalog for PostgresPackageCatalog {
    async fn active_package(
        &self,
        id: PackageId,
    ) -> Result<Option<MembershipPackage>, BillingError> {
        let row: Option<PackageRow> = sqlx::query_as(
            r#"
            SELECT id, name, duration_months, price, active
            FROM packages
            WHERE id = $1 AND active = TRUE
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| BillingError::from(DomainError::database(format!("failed to load package: {e}"))))?;

        row.map(MembershipPackage::try_from).transpose()
    }

    async fn list_active(&self) -> Result<Vec<MembershipPackage>, BillingError> {
        let rows: Vec<PackageRow> = sqlx::query_as(
            r#"
            SELECT id, name, duration_months, price, active
            FROM packages
            WHERE active = TRUE
            ORDER BY duration_months ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| BillingError::from(DomainError::database(format!("failed to list packages: {e}"))))?;

        rows.into_iter().map(MembershipPackage::try_from).collect()
    }
}
