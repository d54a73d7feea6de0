//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are always non-negative. On the wire they are plain JSON numbers
//! (`899.99`), and in SQLite they are stored as `REAL`.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not a number.
    #[error("price must be a number, got '{0}'")]
    Invalid(String),
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount is above [`Price::MAX_AMOUNT`].
    #[error("price cannot exceed {}", Price::MAX_AMOUNT)]
    TooLarge,
}

/// A non-negative product price.
///
/// ## Examples
///
/// ```
/// use bikeshop_core::Price;
///
/// assert!(Price::parse("899.99").is_ok());
/// assert!(Price::parse("0").is_ok());
///
/// assert!(Price::parse("").is_err());
/// assert!(Price::parse("-1").is_err());
/// assert!(Price::parse("cheap").is_err());
/// assert!(Price::parse("79228162514264337593543950335").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Largest accepted amount. Prices are stored as `REAL`, and every
    /// amount up to this bound reads back as a valid `Decimal`.
    pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if the amount is below zero, or
    /// `PriceError::TooLarge` if it is above [`Self::MAX_AMOUNT`] or cannot
    /// be stored as `f64` and read back.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount > Self::MAX_AMOUNT {
            return Err(PriceError::TooLarge);
        }
        amount
            .to_f64()
            .and_then(Decimal::from_f64)
            .ok_or(PriceError::TooLarge)?;

        Ok(Self(amount.normalize()))
    }

    /// Parse a price from user input such as a form field.
    ///
    /// Surrounding whitespace is ignored. Scientific notation is accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, not a number, negative, or
    /// above [`Self::MAX_AMOUNT`].
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }

        let amount = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| PriceError::Invalid(trimmed.to_owned()))?;

        Self::new(amount)
    }

    /// Create a price from a floating point amount (as stored in SQLite).
    ///
    /// # Errors
    ///
    /// Returns an error if the value is NaN, infinite, out of range, or negative.
    pub fn from_f64(value: f64) -> Result<Self, PriceError> {
        let amount =
            Decimal::from_f64(value).ok_or_else(|| PriceError::Invalid(value.to_string()))?;
        Self::new(amount)
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Get the amount as `f64` for storage.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}
