//! Fixed-point money amounts
//!
//! An amount is a signed count of cents. Parsing is strict: a parsed amount
//! is exactly what was typed, or an error. There is no rounding, no
//! truncation of extra decimals and no silent overflow.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use thiserror::Error;

/// A signed amount in cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// The amount if positive, otherwise zero
    pub const fn positive_part(&self) -> Self {
        if self.0 > 0 {
            Self(self.0)
        } else {
            Self(0)
        }
    }

    /// Parse user input such as `12`, `-12.5`, `$12.50` or `-$0.05`.
    ///
    /// `symbol` is the configured currency symbol and may appear after the
    /// sign. The fractional part, when present, is one or two ASCII digits.
    pub fn parse_with_symbol(input: &str, symbol: &str) -> Result<Self, MoneyParseError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let (negative, rest) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let rest = if symbol.is_empty() {
            rest
        } else {
            rest.strip_prefix(symbol).unwrap_or(rest)
        };

        let (whole, fraction) = match rest.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (rest, None),
        };

        if !is_digits(whole) {
            return Err(MoneyParseError::InvalidDigits(input.to_string()));
        }

        let fraction_cents = match fraction {
            None => 0,
            Some(f) if !is_digits(f) => {
                return Err(MoneyParseError::InvalidDigits(input.to_string()))
            }
            Some(f) if f.len() > 2 => {
                return Err(MoneyParseError::TooManyDecimals(input.to_string()))
            }
            Some(f) => {
                // At most two ASCII digits, always fits
                let value: i64 = f
                    .parse()
                    .map_err(|_| MoneyParseError::InvalidDigits(input.to_string()))?;
                if f.len() == 1 {
                    value * 10
                } else {
                    value
                }
            }
        };

        let cents = whole
            .parse::<i64>()
            .ok()
            .and_then(|w| w.checked_mul(100))
            .and_then(|c| c.checked_add(fraction_cents))
            .ok_or_else(|| MoneyParseError::OutOfRange(input.to_string()))?;

        Ok(Self(if negative { -cents } else { cents }))
    }

    /// Render as `-{symbol}12.50`
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        format!("{}{}{}.{:02}", sign, symbol, magnitude / 100, magnitude % 100)
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Plain decimal without a currency symbol, e.g. `-12.50`. Use
/// [`Money::format_with_symbol`] for user-facing output.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with_symbol(""))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Why an amount could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("amount is empty")]
    Empty,
    #[error("'{0}' is not a number like 12 or 12.50")]
    InvalidDigits(String),
    #[error("'{0}' has more than two decimal places")]
    TooManyDecimals(String),
    #[error("'{0}' is too large")]
    OutOfRange(String),
}
