//! Money amounts in Congolese francs.

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Display label of the local currency unit.
pub const CURRENCY_LABEL: &str = "FC";

/// An amount in whole Congolese francs.
///
/// The franc has no circulating subunit, so amounts are whole numbers. All
/// arithmetic saturates at `u64::MAX` instead of overflowing; totals computed
/// from catalog snapshots can never panic.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_francs(francs: u64) -> Self {
        Self(francs)
    }

    pub const fn francs(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Unit price times quantity.
    pub fn times(self, quantity: u64) -> Self {
        Self(self.0.saturating_mul(quantity))
    }

    pub fn saturating_add(self, other: Money) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Digits grouped by thousands with a space, e.g. `12 500`.
    pub fn grouped(self) -> String {
        let digits = self.0.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(' ');
            }
            out.push(ch);
        }
        out
    }
}

impl ValueObject for Money {}

impl From<u64> for Money {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl core::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        self.saturating_add(rhs)
    }
}

impl core::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Money::saturating_add)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.grouped(), CURRENCY_LABEL)
    }
}
