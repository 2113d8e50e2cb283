//! Monetary amount type.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Amount`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The input is not a number.
    #[error("amount must be a number")]
    NotANumber,
    /// The amount is below zero.
    #[error("amount cannot be negative")]
    Negative,
    /// The amount is zero where a positive value is required.
    #[error("amount must be greater than zero")]
    NotPositive,
    /// The amount has fractions smaller than one cent.
    #[error("amount cannot have more than 2 decimal places")]
    TooPrecise,
    /// The amount does not fit the ledger's fixed-point columns.
    #[error("amount must be less than 1000000000000")]
    TooLarge,
}

/// Decimal places kept by the ledger (`NUMERIC(14, 2)`).
pub const MAX_SCALE: u32 = 2;

/// Exclusive upper bound on an amount, in whole currency units.
pub const MAX_WHOLE_UNITS: i64 = 1_000_000_000_000;

/// A non-negative amount of money in the organization's currency unit.
///
/// Backed by [`Decimal`] so ledger sums never accumulate float error.
/// Deserializes from either a JSON number or a numeric string. Values are
/// limited to whole cents below [`MAX_WHOLE_UNITS`], so every amount is
/// stored exactly.
///
/// ```
/// use trustline_core::Amount;
///
/// assert!(Amount::parse("250.50").is_ok());
/// assert!(Amount::parse("-1").is_err());
/// assert!(Amount::parse("abc").is_err());
/// assert!(Amount::parse("0.001").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount, rejecting values the ledger cannot hold exactly.
    ///
    /// Trailing zeros do not count towards the scale, so `10.50` is accepted.
    ///
    /// # Errors
    ///
    /// - [`AmountError::Negative`] if `value < 0`
    /// - [`AmountError::TooPrecise`] for fractions of a cent
    /// - [`AmountError::TooLarge`] if `value >= MAX_WHOLE_UNITS`
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative);
        }
        let value = value.normalize();
        if value.scale() > MAX_SCALE {
            return Err(AmountError::TooPrecise);
        }
        if value >= Decimal::from(MAX_WHOLE_UNITS) {
            return Err(AmountError::TooLarge);
        }
        Ok(Self(value))
    }

    /// Create an amount that must be strictly positive.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Negative`] or [`AmountError::NotPositive`].
    pub fn positive(value: Decimal) -> Result<Self, AmountError> {
        let amount = Self::new(value)?;
        if amount.is_zero() {
            return Err(AmountError::NotPositive);
        }
        Ok(amount)
    }

    /// Parse an amount from text (surrounding whitespace ignored).
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::NotANumber`] for non-numeric input and
    /// [`AmountError::Negative`] for values below zero.
    pub fn parse(s: &str) -> Result<Self, AmountError> {
        let value: Decimal = s.trim().parse().map_err(|_| AmountError::NotANumber)?;
        Self::new(value)
    }

    /// Returns the underlying decimal value.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl std::str::FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::ops::Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl std::iter::Sum<Self> for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |total, a| total + a)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Amount {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Amount {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let value = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(value)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Amount {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
