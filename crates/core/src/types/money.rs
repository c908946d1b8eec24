//! Fixed-point money using decimal arithmetic.
//!
//! All amounts are `rust_decimal::Decimal` values held at two decimal places.
//! Arithmetic that can produce more places (percentages, tax rates) rounds
//! half away from zero back to two places, so a summary computed twice from
//! the same inputs is always identical to the cent.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Sub};
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing [`Money`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The input is not a decimal number.
    #[error("invalid amount: {0}")]
    Invalid(String),
    /// The input is a negative amount.
    #[error("amount cannot be negative: {0}")]
    Negative(String),
}

/// A monetary amount in the store's currency.
///
/// Serializes as a decimal string (`"19.99"`) and accepts either strings or
/// JSON numbers when deserializing. Deserialized amounts go through
/// [`Money::new`], so extra places from the wire are rounded away.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Number of decimal places every amount is rounded to.
    pub const SCALE: u32 = 2;

    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount, rounding to [`Self::SCALE`] places.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self(round(amount))
    }

    /// Create an amount from minor units (cents).
    #[must_use]
    pub fn from_minor(minor: i64) -> Self {
        Self(Decimal::new(minor, Self::SCALE))
    }

    /// Create an amount from whole major units.
    #[must_use]
    pub fn from_major(major: i64) -> Self {
        Self(Decimal::from(major))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Multiply by a quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(self.0 * Decimal::from(quantity))
    }

    /// Take `rate` percent of this amount (`rate` of 7.5 means 7.5%).
    #[must_use]
    pub fn percent(self, rate: Decimal) -> Self {
        Self::new(self.0 * rate / Decimal::ONE_HUNDRED)
    }

    /// Subtract, flooring the result at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        if other.0 >= self.0 {
            Self::ZERO
        } else {
            Self(self.0 - other.0)
        }
    }

    /// Clamp negative amounts to zero.
    #[must_use]
    pub fn non_negative(self) -> Self {
        if self.0.is_sign_negative() {
            Self::ZERO
        } else {
            self
        }
    }
}

/// Round half away from zero to [`Money::SCALE`] places.
fn round(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(Money::SCALE, RoundingStrategy::MidpointAwayFromZero)
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    /// Parse a non-negative amount typed into a form field.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let amount =
            Decimal::from_str(trimmed).map_err(|_| MoneyError::Invalid(trimmed.to_string()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative(trimmed.to_string()));
        }
        Ok(Self::new(amount))
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

/// ISO 4217 currency codes supported by store tenants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    IDR,
}

impl CurrencyCode {
    /// Currency symbol used when rendering prices.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::EUR => "\u{20ac}",
            Self::GBP => "\u{00a3}",
            Self::CAD => "CA$",
            Self::AUD => "A$",
            Self::IDR => "Rp",
        }
    }

    /// Render an amount with this currency's symbol (e.g. `$19.99`).
    #[must_use]
    pub fn format(self, money: Money) -> String {
        format!("{}{money}", self.symbol())
    }
}
