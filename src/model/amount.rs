//! Amount type for handling monetary values that arrive in whatever shape the backend produced.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! may or may not include a currency symbol and commas. It also knows how to coerce an arbitrary
//! JSON value into an amount, degrading anything non-numeric to zero.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use tracing::{trace, warn};

/// Currency symbols that are stripped when parsing an amount string.
const CURRENCY_SYMBOLS: &[char] = &['$', '₹', '€', '£', '¥'];

/// Represents how an amount was (or should be) formatted.
///
/// # Examples
///  - `AmountFormat{ symbol: Some('₹'), commas: true }` -> `-₹60,000.00`
///  - `AmountFormat{ symbol: None, commas: true }` -> `-60,000.00`
///  - `AmountFormat{ symbol: None, commas: false }` -> `-60000.00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AmountFormat {
    /// The currency symbol present in the formatting, if any.
    symbol: Option<char>,
    /// Whether commas are present as thousands separators in the formatting.
    commas: bool,
}

impl Default for AmountFormat {
    fn default() -> Self {
        DEFAULT_FORMAT
    }
}

impl AmountFormat {
    /// Creates a format that uses `symbol` and thousands separators.
    pub const fn with_symbol(symbol: char) -> Self {
        Self {
            symbol: Some(symbol),
            commas: true,
        }
    }
}

/// The default format has no symbol and uses commas: e.g. `-60,000.00`.
const DEFAULT_FORMAT: AmountFormat = AmountFormat {
    symbol: None,
    commas: true,
};

/// Represents a monetary amount.
///
/// Formatting is considered significant for the purposes of equality, so for numeric comparisons,
/// you should access the `Decimal` value and use that.
///
/// # Examples
///
/// ```
/// # use finboard::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("-5000.00").unwrap();
/// let b = Amount::from_str("-$5,000.00").unwrap();
/// assert_ne!(a, b);
/// assert_eq!(a.value(), b.value());
/// ```
///
/// Lenient coercion from JSON never fails:
/// ```
/// # use finboard::model::Amount;
/// # use rust_decimal::Decimal;
/// let v = serde_json::json!("not a number");
/// assert_eq!(Amount::coerce(&v).value(), Decimal::ZERO);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    /// The parsed numerical value.
    value: Decimal,
    /// The way the numerical value was parsed from, or should be written to, a `String`.
    format: AmountFormat,
}

impl Amount {
    /// Creates a new Amount from a Decimal value with default `String` formatting.
    pub const fn new(value: Decimal) -> Self {
        Self {
            value,
            format: DEFAULT_FORMAT,
        }
    }

    /// Creates a new Amount from a Decimal value with the specified formatting.
    pub const fn new_with_format(value: Decimal, format: AmountFormat) -> Self {
        Self { value, format }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value().is_sign_positive()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }

    /// Coerces any JSON value into an `Amount`. Numbers and numeric strings are converted, anything
    /// else (including `null`, booleans, objects and unparseable strings) becomes zero.
    pub fn coerce(value: &Value) -> Self {
        match value {
            Value::Number(n) => match number_to_decimal(n) {
                Some(d) => Amount::new(d),
                None => {
                    warn!("Numeric value {n} is out of range, treating it as 0");
                    Amount::default()
                }
            },
            Value::String(s) => Amount::from_str(s).unwrap_or_else(|e| {
                warn!("Unable to parse '{s}' as an amount ({e}), treating it as 0");
                Amount::default()
            }),
            Value::Null => {
                trace!("Missing amount treated as 0");
                Amount::default()
            }
            other => {
                warn!("Non-numeric value {other} treated as 0");
                Amount::default()
            }
        }
    }
}

fn number_to_decimal(n: &serde_json::Number) -> Option<Decimal> {
    let s = n.to_string();
    if let Ok(d) = Decimal::from_str(&s) {
        return Some(d);
    }
    if let Ok(d) = Decimal::from_scientific(&s) {
        return Some(d);
    }
    n.as_f64().and_then(Decimal::from_f64)
}

/// An error that can occur when parsing strings into `Decimal` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut symbol = None;

        // Remove whitespace
        let trimmed = s.trim();

        // Handle empty string
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // Remove the currency symbol if present: "-₹50.00", "$50.00" or "50.00"
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        let without_symbol = match unsigned.chars().next() {
            Some(c) if CURRENCY_SYMBOLS.contains(&c) => {
                symbol = Some(c);
                unsigned[c.len_utf8()..].trim_start()
            }
            _ => unsigned,
        };

        // Remove commas (thousand separators)
        let without_commas = without_symbol.replace(',', "");
        let commas = without_commas.len() < without_symbol.len();

        // Parse the decimal value
        let mut value = Decimal::from_str(&without_commas)
            .or_else(|_| Decimal::from_scientific(&without_commas))
            .map_err(AmountError)?;
        if negative {
            value = -value;
        }
        Ok(Amount {
            value,
            format: AmountFormat { symbol, commas },
        })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, num) = if self.is_negative() {
            ("-", self.value().abs())
        } else {
            ("", self.value())
        };

        let sym = self.format.symbol.map(String::from).unwrap_or_default();

        if self.format.commas {
            write!(
                f,
                "{sign}{sym}{}",
                format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
            )
        } else {
            write!(f, "{sign}{sym}{num}")
        }
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Serialize::serialize(&self.value, serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Amount::coerce(&value))
    }
}

/// Adds two decimals. A sum outside the decimal range saturates at the nearest bound with a
/// warning instead of panicking.
pub(crate) fn saturating_add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or_else(|| {
        warn!("{a} + {b} is out of range, saturating");
        a.saturating_add(b)
    })
}

/// `a - b`, saturating like `saturating_add`.
pub(crate) fn saturating_sub(a: Decimal, b: Decimal) -> Decimal {
    a.checked_sub(b).unwrap_or_else(|| {
        warn!("{a} - {b} is out of range, saturating");
        a.saturating_sub(b)
    })
}

pub(crate) fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values.into_iter().fold(Decimal::ZERO, saturating_add)
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
