//! Statement amount parsing.

use std::str::FromStr;

use rust_decimal::Decimal;
use smartpocket_core::{Error, Result};

const CURRENCY_SYMBOLS: &[char] = &['€', '$', '£'];

/// Longest accepted integer part. Keeps statement sums far from `Decimal::MAX`.
pub const MAX_INTEGER_DIGITS: usize = 15;

/// Parse a printed amount into a signed decimal.
///
/// Accepts an optional sign before or after a currency symbol
/// (`-€1,234.50`, `€-12.00`), accounting parentheses for negatives, and
/// strips `,` thousands separators before conversion.
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();

    let mut negative = false;
    let mut body = cleaned.as_str();
    if let Some(inner) = body.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        negative = true;
        body = inner;
    }

    loop {
        if let Some(rest) = body.strip_prefix('-') {
            if negative {
                return Err(Error::MalformedAmount(raw.to_string()));
            }
            negative = true;
            body = rest;
        } else if let Some(rest) = body.strip_prefix('+') {
            body = rest;
        } else if let Some(rest) = body.strip_prefix(CURRENCY_SYMBOLS) {
            body = rest;
        } else {
            break;
        }
    }

    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(Error::MalformedAmount(raw.to_string()));
    }
    let integer_digits = body.split('.').next().map_or(0, str::len);
    if integer_digits > MAX_INTEGER_DIGITS {
        return Err(Error::MalformedAmount(raw.to_string()));
    }

    let value = Decimal::from_str(body).map_err(|_| Error::MalformedAmount(raw.to_string()))?;
    Ok(if negative { -value } else { value })
}
