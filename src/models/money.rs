//! Fixed-point money values.
//!
//! Amounts arrive at the API as JSON numbers or strings and are coerced
//! to an exact decimal. A non-numeric value is a validation error, never
//! a silent zero, so data entry mistakes surface immediately.

use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::Error;

/// A monetary amount with exact decimal arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Parse an amount from a JSON field that may be a number or a string.
    ///
    /// This is the validation boundary from the data model: missing or
    /// non-numeric input is rejected with a descriptive message.
    pub fn from_json(field: &str, value: &JsonValue) -> crate::Result<Self> {
        let text = match value {
            JsonValue::Number(n) => n.to_string(),
            JsonValue::String(s) => s.trim().to_string(),
            _ => {
                return Err(Error::Validation(format!(
                    "{} must be a numeric value",
                    field
                )))
            }
        };

        let decimal = Decimal::from_str(&text)
            .map_err(|_| Error::Validation(format!("{} must be a numeric value: {}", field, text)))?;

        Ok(Self(decimal))
    }

    /// Like [`Money::from_json`], additionally rejecting negative amounts.
    pub fn non_negative_from_json(field: &str, value: &JsonValue) -> crate::Result<Self> {
        let money = Self::from_json(field, value)?;
        if money.is_negative() {
            return Err(Error::Validation(format!(
                "{} must not be negative: {}",
                field, money
            )));
        }
        Ok(money)
    }

    /// Canonical text form for storage (and display).
    pub fn to_storage(&self) -> String {
        self.0.normalize().to_string()
    }

    /// Parse a stored amount. Corrupt storage is an internal error, not a
    /// validation error: rows are validated before they are written.
    pub fn from_storage(text: &str) -> crate::Result<Self> {
        Decimal::from_str(text)
            .map(Self)
            .map_err(|_| Error::Internal(format!("Corrupt stored amount: {}", text)))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

// Serialize as a decimal string so clients never see binary floats.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_storage())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        Money::from_json("amount", &value).map_err(serde::de::Error::custom)
    }
}
