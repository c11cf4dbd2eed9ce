//! Money amounts carried as integer minor currency units.
//!
//! The backend stores every monetary field (product price, order total,
//! order item snapshot price) as an integer number of minor units (fen).
//! The client only divides by 100 when displaying; it never rewrites the
//! stored amount.

use core::fmt;
use core::iter::Sum;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Currency symbol shown in front of every formatted amount.
pub const CURRENCY_SYMBOL: &str = "¥";

/// A monetary amount in minor currency units.
///
/// ```
/// use grayshop_core::Price;
///
/// let total = Price::from_minor(1999);
/// assert_eq!(total.to_string(), "¥ 19.99");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Create a price from minor units (e.g. fen).
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// The raw amount in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// The amount in major units, with two decimal places.
    #[must_use]
    pub fn to_major(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Convert a major-unit amount (e.g. `19.99`) to minor units.
    ///
    /// Returns `None` for amounts with more than two decimal places or
    /// outside the `i64` range.
    #[must_use]
    pub fn from_major(amount: Decimal) -> Option<Self> {
        let minor = amount.checked_mul(Decimal::ONE_HUNDRED)?;
        if !minor.fract().is_zero() {
            return None;
        }
        minor.to_i64().map(Self)
    }

    /// Price of `quantity` units, saturating on overflow.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(i64::from(quantity)))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CURRENCY_SYMBOL} {:.2}", self.to_major())
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.fold(0_i64, |acc, p| acc.saturating_add(p.0)))
    }
}

impl From<i64> for Price {
    fn from(minor: i64) -> Self {
        Self(minor)
    }
}
