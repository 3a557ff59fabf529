//! Membership package catalog entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Money, PackageId};

/// A purchasable membership package.
///
/// Immutable reference data: invoices snapshot the price at purchase time
/// and memberships snapshot the duration, so later catalog edits never
/// retroactively change a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipPackage {
    pub id: PackageId,
    pub name: String,
    pub duration_months: u32,
    pub price: Money,
    pub active: bool,
}

impl MembershipPackage {
    pub fn new(name: impl Into<String>, duration_months: u32, price: Money) -> Self {
        Self {
            id: PackageId::new(),
            name: name.into(),
            duration_months,
            price,
            active: true,
        }
    }
}
