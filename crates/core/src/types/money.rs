//! Decimal money amounts.
//!
//! Prices are stored as `NUMERIC(20, 2)` and carried as [`Decimal`] end to end.
//! Amounts are compared exactly; display rounds to two places.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Mul};
use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors produced when reading an amount from user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    /// The value is not a number.
    #[error("'{0}' is not a valid amount")]
    Invalid(String),
    /// The JSON value is neither a number nor a string.
    #[error("amount must be a number or a numeric string")]
    WrongType,
}

/// A monetary amount in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying decimal.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Parse a decimal string such as `"1250.50"`.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Invalid`] if the string is not a decimal number.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        let trimmed = s.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Self)
            .map_err(|_| MoneyError::Invalid(trimmed.to_owned()))
    }

    /// Read a client-submitted total, which browsers send either as a JSON
    /// number or as a string.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError`] if the value is not numeric.
    pub fn parse_submitted(value: &serde_json::Value) -> Result<Self, MoneyError> {
        match value {
            serde_json::Value::Number(n) => Self::parse(&n.to_string()),
            serde_json::Value::String(s) => Self::parse(s),
            _ => Err(MoneyError::WrongType),
        }
    }

    /// Amount rounded to two decimal places (banker's rounding).
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
    }

    /// Amount in minor units (kobo, cents), as payment gateways expect.
    #[must_use]
    pub fn to_minor_units(&self) -> i64 {
        (self.rounded() * Decimal::ONE_HUNDRED).to_i64().unwrap_or(0)
    }

    /// Two-decimal amount with thousands separators, e.g. `1,234,567.50`.
    #[must_use]
    pub fn format_grouped(&self) -> String {
        let fixed = format!("{:.2}", self.rounded().abs());
        let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        let sign = if self.rounded().is_sign_negative() && !self.rounded().is_zero() {
            "-"
        } else {
            ""
        };
        format!("{sign}{grouped}.{frac}")
    }

    /// Grouped amount prefixed with a currency symbol, e.g. `₦1,234.50`.
    #[must_use]
    pub fn display_with(&self, symbol: &str) -> String {
        let grouped = self.format_grouped();
        grouped.strip_prefix('-').map_or_else(
            || format!("{symbol}{grouped}"),
            |abs| format!("-{symbol}{abs}"),
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.rounded())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        Money::parse(s).unwrap()
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(money("1234567.5").format_grouped(), "1,234,567.50");
        assert_eq!(money("999").format_grouped(), "999.00");
        assert_eq!(money("1000").format_grouped(), "1,000.00");
        assert_eq!(money("0").format_grouped(), "0.00");
        assert_eq!(money("-2500.1").format_grouped(), "-2,500.10");
    }

    #[test]
    fn display_places_symbol_after_sign() {
        assert_eq!(money("15000").display_with("₦"), "₦15,000.00");
        assert_eq!(money("-3").display_with("$"), "-$3.00");
    }

    #[test]
    fn parses_submitted_numbers_and_strings() {
        let from_number = Money::parse_submitted(&serde_json::json!(2500.5)).unwrap();
        let from_string = Money::parse_submitted(&serde_json::json!(" 2500.50 ")).unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(
            Money::parse_submitted(&serde_json::json!(null)),
            Err(MoneyError::WrongType)
        );
        assert!(Money::parse_submitted(&serde_json::json!("abc")).is_err());
    }

    #[test]
    fn equality_ignores_trailing_zeros() {
        assert_eq!(money("10.5"), money("10.50"));
    }

    #[test]
    fn minor_units() {
        assert_eq!(money("1250.75").to_minor_units(), 125_075);
        assert_eq!(money("0.005").to_minor_units(), 0);
    }

    #[test]
    fn arithmetic() {
        let total: Money = [money("1.10"), money("2.20")].into_iter().sum();
        assert_eq!(total, money("3.30"));
        assert_eq!(money("2.50") * 3, money("7.5"));
    }
}
