//! Package catalog port.
//!
//! Read access to the sellable membership packages. Deactivated packages
//! stay in storage for historical invoices but are never sold again.

use async_trait::async_trait;

use crate::domain::billing::BillingError;
use crate::domain::foundation::PackageId;
use crate::domain::membership::MembershipPackage;

/// Read port for the membership package catalog.
#[async_trait]
pub trait PackageCatalog: Send + Sync {
    /// An active package by id.
    ///
    /// Returns `None` for an unknown or deactivated package.
    async fn active_package(
        &self,
        id: PackageId,
    ) -> Result<Option<MembershipPackage>, BillingError>;

    /// All active packages, shortest duration first.
    async fn list_active(&self) -> Result<Vec<MembershipPackage>, BillingError>;
}
