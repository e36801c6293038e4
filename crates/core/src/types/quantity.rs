//! Positive item quantities for carts and orders.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// The value is zero or negative.
    #[error("quantity must be at least 1 (got {0})")]
    NotPositive(i64),
    /// The value does not fit the storage column.
    #[error("quantity is too large (got {0})")]
    TooLarge(i64),
}

/// A number of units of one product. Always `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(1);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NotPositive` if `value < 1`.
    pub const fn new(value: i32) -> Result<Self, QuantityError> {
        if value < 1 {
            return Err(QuantityError::NotPositive(value as i64));
        }
        Ok(Self(value))
    }

    /// The quantity as an `i32`.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Sum of two quantities, or `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 1 {
            return Err(QuantityError::NotPositive(value));
        }
        i32::try_from(value)
            .map(Self)
            .map_err(|_| QuantityError::TooLarge(value))
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(Quantity::new(0), Err(QuantityError::NotPositive(0)));
        assert_eq!(Quantity::new(-4), Err(QuantityError::NotPositive(-4)));
        assert_eq!(Quantity::new(1), Ok(Quantity::ONE));
    }

    #[test]
    fn test_rejects_out_of_range() {
        let huge = i64::from(i32::MAX) + 1;
        assert_eq!(Quantity::try_from(huge), Err(QuantityError::TooLarge(huge)));
    }

    #[test]
    fn test_checked_add() {
        let two = Quantity::new(2).unwrap();
        assert_eq!(two.checked_add(two), Quantity::new(4).ok());
        assert_eq!(Quantity::new(i32::MAX).unwrap().checked_add(two), None);
    }

    #[test]
    fn test_deserialize() {
        let q: Quantity = serde_json::from_str("3").unwrap();
        assert_eq!(q.get(), 3);
        assert!(serde_json::from_str::<Quantity>("0").is_err());
    }
}
