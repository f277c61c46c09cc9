//! Amount type for handling the currency values returned by the billing provider.
//!
//! The provider returns amounts as decimal strings with many fractional digits (and occasionally
//! in scientific notation for tiny charges). `Amount` keeps the full precision and only rounds to
//! cents when it is displayed.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// The number of decimal places used whenever an amount is shown to a person.
pub const DISPLAY_PLACES: u32 = 2;

/// Represents a dollar amount.
///
/// Parsing accepts the provider's plain decimal strings as well as the `$1,234.56` form that this
/// type writes when displayed.
///
/// # Examples
///
/// ```
/// # use cost_report::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("1234.5671").unwrap();
/// assert_eq!(amount.to_string(), "$1,234.57");
///
/// let parsed = Amount::from_str("-$1,234.57").unwrap();
/// assert_eq!(parsed.to_string(), "-$1,234.57");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying, unrounded, Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// The value rounded to cents (half away from zero), which is what every rendered format shows.
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(DISPLAY_PLACES, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Lossy conversion used when writing numeric spreadsheet cells.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError {
    input: String,
    inner: rust_decimal::Error,
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.inner, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "unable to parse '{}' as an amount: {}", self.input, self.inner)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.inner)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // "-$50.00" and "$50.00" lose the dollar sign, "-50.00" and "50.00" pass through.
        let without_dollar = if let Some(after_minus) = trimmed.strip_prefix('-') {
            match after_minus.strip_prefix('$') {
                Some(after_dollar) => format!("-{after_dollar}"),
                None => trimmed.to_string(),
            }
        } else {
            trimmed.strip_prefix('$').unwrap_or(trimmed).to_string()
        };
        let plain = without_dollar.replace(',', "");

        let parsed = if plain.contains(['e', 'E']) {
            Decimal::from_scientific(&plain)
        } else {
            Decimal::from_str(&plain)
        };

        parsed.map(Amount).map_err(|inner| AmountError {
            input: s.to_string(),
            inner,
        })
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded();
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        write!(
            f,
            "{sign}${}",
            format_num::format_num!(",.2", rounded.abs().to_f64().unwrap_or_default())
        )
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}
