use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Amounts are exact decimals in the tracked crypto unit.
/// Sign is never stored in an amount; it is carried by the transaction type.
pub type Amount = Decimal;

/// Format a decimal with exactly two fractional digits.
/// Rounds half away from zero: 2.345 -> "2.35", -1.005 -> "-1.01"
pub fn format_fixed2(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Format a unit amount without trailing zeros.
/// Example: 12.500 -> "12.5", 100.0 -> "100"
pub fn format_amount(amount: Amount) -> String {
    amount.normalize().to_string()
}

/// Parse user input into an amount.
/// Accepts "50", "50.25", ".5" and a leading "+"; rejects anything else.
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    let unsigned = input.strip_prefix('+').unwrap_or(input);
    let normalized = if unsigned.starts_with('.') {
        format!("0{}", unsigned)
    } else {
        unsigned.to_string()
    };

    Decimal::from_str(&normalized).map_err(|_| ParseAmountError::InvalidFormat(input.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    Empty,
    InvalidFormat(String),
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::Empty => write!(f, "empty amount"),
            ParseAmountError::InvalidFormat(input) => write!(f, "invalid amount: {}", input),
        }
    }
}

impl std::error::Error for ParseAmountError {}
