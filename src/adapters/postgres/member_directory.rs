//! PostgreSQL implementation of MemberDirectory.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::billing::BillingError;
use crate::domain::foundation::{DomainError, MemberId};
use crate::ports::MemberDirectory;

/// PostgreSQL implementation of the MemberDirectory port.
pub struct PostgresMemberDirectory {
    pool: PgPool,
}

impl PostgresMemberDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberDirectory for PostgresMemberDirectory {
    async fn email_for(&self, member_id: MemberId) -> Result<Option<String>, BillingError> {
        let email: Option<(String,)> =
            sqlx::query_as("SELECT email FROM members WHERE id = $1")
                .bind(member_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    BillingError::from(DomainError::database(format!(
                        "failed to load member email: {e}"
                    )))
                })?;

        Ok(email.map(|(email,)| email))
    }
}
