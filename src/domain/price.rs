//! Fixed-point prices with exactly two decimal places.
//!
//! Amounts are held as whole cents so arithmetic and comparisons stay exact.
//! The textual form is always rendered with two fraction digits (`5.50`),
//! which is also how prices travel through the cache, the API and reports.
//! Parsing accepts at most two fraction digits and rejects negative amounts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// Largest amount that fits the `NUMERIC(10,2)` column, in cents.
const MAX_CENTS: i64 = 9_999_999_999;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    #[error("price is empty")]
    Empty,
    #[error("price `{0}` is not a decimal number")]
    Malformed(String),
    #[error("price must not be negative")]
    Negative,
    #[error("price `{0}` has more than two decimal places")]
    TooPrecise(String),
    #[error("price exceeds the supported range")]
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    cents: i64,
}

impl Price {
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        if cents < 0 {
            return Err(PriceError::Negative);
        }
        if cents > MAX_CENTS {
            return Err(PriceError::OutOfRange);
        }
        Ok(Self { cents })
    }

    pub fn cents(self) -> i64 {
        self.cents
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }
        if trimmed.starts_with('-') {
            return Err(PriceError::Negative);
        }
        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !is_digits(whole) || !is_digits(fraction) {
            return Err(PriceError::Malformed(trimmed.to_string()));
        }
        if unsigned.contains('.') && fraction.is_empty() {
            return Err(PriceError::Malformed(trimmed.to_string()));
        }
        if fraction.len() > 2 {
            return Err(PriceError::TooPrecise(trimmed.to_string()));
        }

        let units: i64 = whole.parse().map_err(|_| PriceError::OutOfRange)?;
        let fraction_cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| PriceError::OutOfRange)? * 10,
            _ => fraction.parse().map_err(|_| PriceError::OutOfRange)?,
        };

        let cents = units
            .checked_mul(100)
            .and_then(|value| value.checked_add(fraction_cents))
            .ok_or(PriceError::OutOfRange)?;
        Self::from_cents(cents)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

struct PriceVisitor;

impl de::Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative amount with at most two decimal places")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Price, E> {
        value.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Price, E> {
        let units = i64::try_from(value).map_err(|_| E::custom(PriceError::OutOfRange))?;
        units
            .checked_mul(100)
            .ok_or(PriceError::OutOfRange)
            .and_then(Price::from_cents)
            .map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Price, E> {
        if value < 0 {
            return Err(E::custom(PriceError::Negative));
        }
        self.visit_u64(value.unsigned_abs())
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Price, E> {
        if !value.is_finite() {
            return Err(E::custom(PriceError::Malformed(value.to_string())));
        }
        value.to_string().parse().map_err(E::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_renders_two_decimals() {
        let price: Price = "5.5".parse().expect("valid price");
        assert_eq!(price.cents(), 550);
        assert_eq!(price.to_string(), "5.50");

        let whole: Price = "12".parse().expect("valid price");
        assert_eq!(whole.to_string(), "12.00");

        let exact: Price = " 0.07 ".parse().expect("valid price");
        assert_eq!(exact.to_string(), "0.07");
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!("".parse::<Price>(), Err(PriceError::Empty));
        assert_eq!("-1.00".parse::<Price>(), Err(PriceError::Negative));
        assert_eq!(
            "1.234".parse::<Price>(),
            Err(PriceError::TooPrecise("1.234".into()))
        );
        assert!(matches!("abc".parse::<Price>(), Err(PriceError::Malformed(_))));
        assert!(matches!("1.".parse::<Price>(), Err(PriceError::Malformed(_))));
        assert!(matches!(".5".parse::<Price>(), Err(PriceError::Malformed(_))));
        assert_eq!(
            "100000000.00".parse::<Price>(),
            Err(PriceError::OutOfRange)
        );
    }

    #[test]
    fn deserializes_from_strings_and_numbers() {
        let from_str: Price = serde_json::from_str("\"5.50\"").expect("string price");
        let from_float: Price = serde_json::from_str("5.5").expect("float price");
        let from_int: Price = serde_json::from_str("7").expect("integer price");

        assert_eq!(from_str, from_float);
        assert_eq!(from_int.to_string(), "7.00");
        assert!(serde_json::from_str::<Price>("-2").is_err());
        assert!(serde_json::from_str::<Price>("1.005").is_err());
    }

    #[test]
    fn serializes_as_string() {
        let price = Price::from_cents(1999).expect("in range");
        assert_eq!(serde_json::to_string(&price).expect("json"), "\"19.99\"");
    }
}
