//! ListPackagesHandler - Query handler for the sellable package catalog.

use std::sync::Arc;

use crate::domain::billing::BillingError;
use crate::domain::membership::MembershipPackage;
use crate::ports::PackageCatalog;

/// Handler returning every package currently on sale.
pub struct ListPackagesHandler {
    catalog: Arc<dyn PackageCatalog>,
}

impl ListPackagesHandler {
    pub fn new(catalog: Arc<dyn PackageCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self) -> Result<Vec<MembershipPackage>, BillingError> {
        self.catalog.list_active().await
    }
}
