use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Amount, format_fixed2};

/// Conversion factor from the crypto unit to the local fiat currency.
/// Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct ExchangeRate(Decimal);

impl ExchangeRate {
    /// Returns `None` unless the value is strictly positive.
    pub fn new(value: Decimal) -> Option<Self> {
        (value > Decimal::ZERO).then_some(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Convert a crypto amount into local currency.
    /// `None` when the product does not fit in a decimal.
    pub fn convert(&self, amount: Amount) -> Option<Decimal> {
        amount.checked_mul(self.0)
    }

    /// Convert and format with two fixed decimal places for display.
    pub fn format_local(&self, amount: Amount) -> Option<String> {
        self.convert(amount).map(format_fixed2)
    }

    /// Text form used for persistence.
    pub fn to_storage_string(&self) -> String {
        self.0.normalize().to_string()
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for ExchangeRate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|e| format!("invalid rate '{}': {}", s, e))?;
        ExchangeRate::new(value).ok_or_else(|| format!("rate must be positive, got {}", value))
    }
}

impl TryFrom<Decimal> for ExchangeRate {
    type Error = String;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        ExchangeRate::new(value).ok_or_else(|| format!("rate must be positive, got {}", value))
    }
}

impl From<ExchangeRate> for Decimal {
    fn from(rate: ExchangeRate) -> Self {
        rate.0
    }
}

/// Citation accompanying a fetched rate. Held for the current session only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSource {
    pub title: String,
    pub uri: String,
}

impl RateSource {
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
        }
    }
}

/// Raw result of a rate lookup: a rate if one was found, plus its citations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateQuote {
    pub rate: Option<Decimal>,
    pub sources: Vec<RateSource>,
}

impl RateQuote {
    pub fn new(rate: Option<Decimal>, sources: Vec<RateSource>) -> Self {
        Self { rate, sources }
    }

    /// The quoted rate, if it is defined and usable.
    pub fn exchange_rate(&self) -> Option<ExchangeRate> {
        self.rate.and_then(ExchangeRate::new)
    }
}
