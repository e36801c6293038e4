//! Non-negative monetary amounts using decimal arithmetic.
//!
//! The storefront sells in a single currency, so a price is just an amount.
//! Amounts are never stored as floats: totals are computed with
//! [`rust_decimal::Decimal`] and persisted as `NUMERIC(12, 2)`.

use core::fmt;
use core::iter::Sum;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Quantity;

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),

    /// The amount has more than two decimal places.
    #[error("price cannot have more than 2 decimal places (got {0})")]
    TooPrecise(Decimal),

    /// The amount does not fit `NUMERIC(12, 2)`.
    #[error("price cannot exceed {max} (got {0})", max = Price::MAX)]
    TooLarge(Decimal),
}

/// A price in the store currency. Always within `0..=Price::MAX` and held
/// at two decimal places, so `"5"` and `"5.00"` serialize alike.
///
/// ```
/// use bazaar_core::{Price, Quantity};
/// use rust_decimal::Decimal;
///
/// let unit = Price::new(Decimal::new(1999, 2)).unwrap();
/// let line = unit.times(Quantity::new(3).unwrap());
/// assert_eq!(line.amount(), Decimal::new(5997, 2));
///
/// assert!(Price::new(Decimal::NEGATIVE_ONE).is_err());
/// assert!(Price::new(Decimal::new(1999, 3)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Decimal places kept for every amount.
    pub const SCALE: u32 = 2;

    /// A price of zero (`0.00`).
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, Self::SCALE));

    /// The largest amount `NUMERIC(12, 2)` holds: `9999999999.99`.
    pub const MAX: Self = Self(Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, Self::SCALE));

    /// Create a price from a decimal amount.
    ///
    /// Trailing zeros beyond two places are accepted (`"1.500"` is `1.50`).
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount < 0`,
    /// `PriceError::TooPrecise` if it needs more than two decimal places, and
    /// `PriceError::TooLarge` if it exceeds [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_zero() {
            return Ok(Self::ZERO);
        }
        if amount.is_sign_negative() {
            return Err(PriceError::Negative(amount));
        }
        if amount.normalize().scale() > Self::SCALE {
            return Err(PriceError::TooPrecise(amount));
        }
        if amount > Self::MAX.0 {
            return Err(PriceError::TooLarge(amount));
        }

        let mut amount = amount;
        amount.rescale(Self::SCALE);
        Ok(Self(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Sum of two amounts, or `None` on decimal overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(self, quantity: Quantity) -> Self {
        Self(self.0 * Decimal::from(quantity.get()))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::ZERO
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |total, p| Self(total.0 + p.0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(cents: i64) -> Price {
        Price::new(Decimal::new(cents, 2)).unwrap()
    }

    #[test]
    fn test_zero_is_valid() {
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_negative_rejected() {
        let err = Price::new(Decimal::new(-1, 2)).unwrap_err();
        assert_eq!(err, PriceError::Negative(Decimal::new(-1, 2)));
    }

    #[test]
    fn test_largest_column_value_accepted() {
        let max = Price::new(Decimal::new(999_999_999_999, 2)).unwrap();
        assert_eq!(max, Price::MAX);
        assert_eq!(Price::MAX.to_string(), "9999999999.99");
    }

    #[test]
    fn test_too_large_rejected() {
        let amount = Decimal::from(100_000_000_000_i64);
        assert_eq!(Price::new(amount).unwrap_err(), PriceError::TooLarge(amount));

        let just_over = Decimal::from(10_000_000_000_i64);
        assert!(matches!(Price::new(just_over), Err(PriceError::TooLarge(_))));
    }

    #[test]
    fn test_more_than_two_decimals_rejected() {
        let amount = Decimal::new(1999, 3);
        assert_eq!(Price::new(amount).unwrap_err(), PriceError::TooPrecise(amount));
    }

    #[test]
    fn test_trailing_zeros_are_not_extra_precision() {
        let p = Price::new(Decimal::new(1500, 3)).unwrap();
        assert_eq!(p, price(150));
        assert_eq!(p.amount().scale(), 2);
    }

    #[test]
    fn test_amounts_serialize_with_two_decimals() {
        assert_eq!(serde_json::to_string(&Price::ZERO).unwrap(), "\"0.00\"");
        assert_eq!(serde_json::to_string(&Price::default()).unwrap(), "\"0.00\"");

        let whole = Price::new(Decimal::from(5)).unwrap();
        assert_eq!(serde_json::to_string(&whole).unwrap(), "\"5.00\"");

        let empty: Price = core::iter::empty().sum();
        assert_eq!(serde_json::to_string(&empty).unwrap(), "\"0.00\"");
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [
            price(10_000).times(Quantity::new(2).unwrap()),
            price(250).times(Quantity::new(4).unwrap()),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, price(21_000));
    }

    #[test]
    fn test_display_has_two_decimals() {
        assert_eq!(price(1999).to_string(), "19.99");
        assert_eq!(Price::new(Decimal::from(100)).unwrap().to_string(), "100.00");
    }

    #[test]
    fn test_deserialize_accepts_numbers_and_rejects_negatives() {
        let p: Price = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(p, price(1250));

        assert!(serde_json::from_str::<Price>("\"-3\"").is_err());
    }
}
