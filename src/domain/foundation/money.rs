//! Monetary value object.
//!
//! Amounts are whole Vietnamese dong stored as `i64`; the gateway wire
//! format is integer minor units (amount x 100). Keeping both sides integer
//! makes amount comparison exact, so a mismatch is a validation outcome
//! rather than a float-rounding accident.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whole-VND monetary amount.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates an amount of whole VND.
    pub fn vnd(amount: i64) -> Self {
        Self(amount)
    }

    /// The amount in whole VND.
    pub fn amount(&self) -> i64 {
        self.0
    }

    /// The amount in gateway minor units (x100), as carried by `vnp_Amount`.
    pub fn minor_units(&self) -> i64 {
        self.0 * 100
    }

    /// Reconstructs an amount from gateway minor units.
    ///
    /// Returns `None` when the value is not a whole-VND multiple of 100;
    /// callers treat that as an amount mismatch, not an error.
    pub fn from_minor_units(minor: i64) -> Option<Self> {
        if minor % 100 != 0 {
            return None;
        }
        Some(Self(minor / 100))
    }
}

impl fmt::Display for Money {
    /// Formats with dot thousand-separators and the dong suffix, matching
    /// the storefront rendering (`500.000đ`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        if self.0 < 0 {
            write!(f, "-{}đ", grouped)
        } else {
            write!(f, "{}đ", grouped)
        }
    }
}
