//! Membership entity and its date arithmetic.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MemberId, MembershipId, PackageId};

use super::MembershipPackage;

/// A member's entitlement window for one package.
///
/// Created inactive together with its invoice; [`Membership::activate`] is
/// called exactly once, by the settlement of that invoice. A member may hold
/// at most one membership that is active and unexpired at a time - the
/// purchase operation enforces this before creating a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub member_id: MemberId,
    pub package_id: PackageId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub active: bool,
}

impl Membership {
    /// Builds an inactive membership for a package.
    ///
    /// The package is a required argument; the end date is derived here,
    /// once, from its duration. Nothing is fetched lazily.
    pub fn for_package(
        member_id: MemberId,
        package: &MembershipPackage,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: MembershipId::new(),
            member_id,
            package_id: package.id,
            start_date,
            end_date: add_months(start_date, package.duration_months),
            active: false,
        }
    }

    /// Marks the membership active. Idempotent.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Whether the membership grants access on the given day.
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.active && self.end_date >= today
    }
}

/// Advances a date by whole months, clamping the day-of-month to the last
/// valid day of the resulting month (Jan 31 + 1 month is Feb 28/29, never
/// Mar 2/3).
pub fn add_months(start: NaiveDate, months: u32) -> NaiveDate {
    start
        .checked_add_months(Months::new(months))
        .expect("membership end date within representable range")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Money;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn add_months_clamps_to_leap_february() {
        assert_eq!(add_months(d(2024, 1, 31), 1), d(2024, 2, 29));
    }

    #[test]
    fn add_months_clamps_to_common_february() {
        assert_eq!(add_months(d(2023, 1, 31), 1), d(2023, 2, 28));
    }

    #[test]
    fn add_months_keeps_valid_days() {
        assert_eq!(add_months(d(2024, 3, 15), 3), d(2024, 6, 15));
    }

    #[test]
    fn add_months_crosses_year_boundary() {
        assert_eq!(add_months(d(2024, 11, 30), 3), d(2025, 2, 28));
        assert_eq!(add_months(d(2024, 6, 1), 12), d(2025, 6, 1));
    }

    #[test]
    fn for_package_computes_end_date_and_starts_inactive() {
        let pkg = MembershipPackage::new("GÓI 3 THÁNG", 3, Money::vnd(1_200_000));
        let m = Membership::for_package(MemberId::new(), &pkg, d(2024, 1, 31));

        assert!(!m.active);
        assert_eq!(m.package_id, pkg.id);
        assert_eq!(m.end_date, d(2024, 4, 30));
    }

    #[test]
    fn is_current_requires_active_and_unexpired() {
        let pkg = MembershipPackage::new("GÓI 1 THÁNG", 1, Money::vnd(500_000));
        let mut m = Membership::for_package(MemberId::new(), &pkg, d(2024, 1, 1));

        let today = d(2024, 1, 15);
        assert!(!m.is_current(today));

        m.activate();
        assert!(m.is_current(today));
        assert!(m.is_current(m.end_date));
        assert!(!m.is_current(d(2024, 2, 2)));
    }

    #[test]
    fn activate_is_idempotent() {
        let pkg = MembershipPackage::new("GÓI 1 THÁNG", 1, Money::vnd(500_000));
        let mut m = Membership::for_package(MemberId::new(), &pkg, d(2024, 1, 1));
        m.activate();
        m.activate();
        assert!(m.active);
    }
}
