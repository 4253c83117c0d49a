use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use crate::error::ValidationError;

/// Statute miles to kilometres.
pub const KM_PER_MILE: Decimal = Decimal::from_parts(160934, 0, 0, false, 5);

/// A non-negative distance in kilometres, held at one decimal place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Kilometres(Decimal);

impl TryFrom<Decimal> for Kilometres {
    type Error = ValidationError;

    fn try_from(km: Decimal) -> Result<Self, Self::Error> {
        Kilometres::new(km).ok_or_else(|| ValidationError::NegativeDistance(km.to_string()))
    }
}

impl From<Kilometres> for Decimal {
    fn from(km: Kilometres) -> Self {
        km.0
    }
}

impl Kilometres {
    /// Returns `None` for negative input.
    pub fn new(km: Decimal) -> Option<Self> {
        if km.is_sign_negative() && !km.is_zero() {
            return None;
        }
        Some(Kilometres(round_tenths(km)))
    }

    /// Returns `None` for negative input or when the product overflows.
    pub fn from_miles(miles: Decimal) -> Option<Self> {
        miles.checked_mul(KM_PER_MILE).and_then(Self::new)
    }

    pub fn zero() -> Self {
        Kilometres(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn value(self) -> Decimal {
        self.0
    }
}

/// Half-up to one decimal place, matching how odometer readings are quoted.
pub fn round_tenths(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

impl fmt::Display for Kilometres {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} km", self.0)
    }
}

impl Add for Kilometres {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Kilometres(round_tenths(self.0.saturating_add(rhs.0)))
    }
}

impl Sum for Kilometres {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Kilometres::zero(), |a, b| a + b)
    }
}
