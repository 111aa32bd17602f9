//! # Money Types
//!
//! Amounts are held in minor units (centavos, cents) so that ledger sums are exact.
//! On the wire the backend speaks plain decimal JSON numbers (`50`, `12.5`).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};
use std::str::FromStr;

/// Supported display currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    PHP,
    USD,
    EUR,
    GBP,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::PHP => "php",
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::PHP => "₱",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "php" => Ok(Currency::PHP),
            "usd" => Ok(Currency::USD),
            "eur" => Ok(Currency::EUR),
            "gbp" => Ok(Currency::GBP),
            other => Err(format!("unsupported currency: {}", other)),
        }
    }
}

/// A monetary amount in minor units (two decimal places)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Largest magnitude accepted from input: 100 billion major units
    pub const MAX_INPUT: Amount = Amount(10_000_000_000_000);

    /// Create an amount from minor units
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Create an amount from whole major units (`Amount::from_major(50)` is 50.00)
    pub const fn from_major(major: i64) -> Self {
        Self(major * 100)
    }

    /// Convert a decimal amount, rounding to the nearest minor unit.
    /// Returns `None` for NaN, infinite input or a magnitude above [`Amount::MAX_INPUT`].
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let minor = (amount * 100.0).round();
        if minor.abs() > Self::MAX_INPUT.0 as f64 {
            return None;
        }
        Some(Self(minor as i64))
    }

    pub fn minor_units(&self) -> i64 {
        self.0
    }

    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Format for display (e.g., "₱130.00")
    pub fn display(&self, currency: Currency) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}{}.{:02}", sign, currency.symbol(), abs / 100, abs % 100)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Amount {
    type Output = Amount;

    fn mul(self, rhs: u32) -> Amount {
        Amount(self.0.saturating_mul(i64::from(rhs)))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Whole amounts go out as integers so the backend sees `130`, not `130.0`
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.as_decimal())
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawAmount {
            Number(f64),
            Text(String),
        }

        let value = match RawAmount::deserialize(deserializer)? {
            RawAmount::Number(n) => n,
            RawAmount::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| serde::de::Error::custom(format!("invalid amount: {:?}", s)))?,
        };

        Amount::from_decimal(value)
            .ok_or_else(|| serde::de::Error::custom(format!("amount out of range: {}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_conversion() {
        assert_eq!(Amount::from_decimal(10.99), Some(Amount::from_minor(1099)));
        assert_eq!(Amount::from_decimal(50.0), Some(Amount::from_major(50)));
        assert_eq!(Amount::from_decimal(f64::NAN), None);
        assert_eq!(Amount::from_major(13).as_decimal(), 13.0);
    }

    #[test]
    fn test_input_bound() {
        assert_eq!(
            Amount::from_decimal(100_000_000_000.0),
            Some(Amount::MAX_INPUT)
        );
        assert_eq!(Amount::from_decimal(100_000_000_000.01), None);
        assert_eq!(Amount::from_decimal(-92_233_720_368_547_758.0), None);
        assert!(serde_json::from_str::<Amount>("92233720368547758").is_err());
        assert!(serde_json::from_str::<Amount>("\"1e300\"").is_err());
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Amount::from_minor(i64::MAX - 1);
        assert_eq!(huge * 2, Amount::from_minor(i64::MAX));
        assert_eq!(huge + huge, Amount::from_minor(i64::MAX));
        assert_eq!(
            [huge, huge, Amount::from_major(1)].into_iter().sum::<Amount>(),
            Amount::from_minor(i64::MAX)
        );
        assert_eq!(Amount::from_major(50) * 3, Amount::from_major(150));
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::from_major(130).display(Currency::PHP), "₱130.00");
        assert_eq!(Amount::from_minor(1999).display(Currency::USD), "$19.99");
        assert_eq!(Amount::from_minor(-250).display(Currency::EUR), "-€2.50");
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(serde_json::to_string(&Amount::from_major(130)).unwrap(), "130");
        assert_eq!(serde_json::to_string(&Amount::from_minor(1250)).unwrap(), "12.5");

        let parsed: Amount = serde_json::from_str("\"45.50\"").unwrap();
        assert_eq!(parsed, Amount::from_minor(4550));
        assert!(serde_json::from_str::<Amount>("\"abc\"").is_err());
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("PHP".parse::<Currency>(), Ok(Currency::PHP));
        assert!("jpy".parse::<Currency>().is_err());
    }
}
