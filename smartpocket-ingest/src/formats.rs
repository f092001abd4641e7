//! Statement record grammars.
//!
//! A [`FormatSpec`] is a compiled regex plus the layout of its amount
//! columns. Two families ship built in:
//!
//! ```text
//!   signed_day_month      12/11  Tesco Metro                   -45.00
//!   named_month_columns   03 Jan 2025  Transfer to John   50.00   0.00
//! ```
//!
//! New bank formats are new specs; the extractor, resolver and categorizer
//! stay untouched.

use regex::{Captures, Regex};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smartpocket_core::{Error, Result};

use crate::amount::parse_amount;
use crate::types::RawMatch;

/// How a grammar encodes money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountLayout {
    /// One `amount` group whose sign gives the direction.
    Signed,
    /// Separate non-negative `debit` (money out) and `credit` (money in) groups.
    DebitCredit,
}

impl AmountLayout {
    fn required_groups(&self) -> &'static [&'static str] {
        match self {
            AmountLayout::Signed => &["date", "desc", "amount"],
            AmountLayout::DebitCredit => &["date", "desc", "debit", "credit"],
        }
    }
}

pub const SIGNED_DAY_MONTH: &str = "signed_day_month";
pub const NAMED_MONTH_COLUMNS: &str = "named_month_columns";

/// Names accepted by [`FormatSpec::builtin`].
pub const BUILTIN_FORMATS: &[&str] = &[SIGNED_DAY_MONTH, NAMED_MONTH_COLUMNS];

// DD/MM DESCRIPTION SIGNED_AMOUNT
const SIGNED_DAY_MONTH_PATTERN: &str = concat!(
    r"\b(?P<date>\d{1,2}/\d{1,2})\s+",
    r"(?P<desc>\S.*?)\s+",
    r"(?P<amount>[-+]?[€$£]?\s?-?\d[\d,]*\.\d{2})\b"
);

// D MMM YYYY DESCRIPTION DEBIT CREDIT
const NAMED_MONTH_COLUMNS_PATTERN: &str = concat!(
    r"\b(?P<date>\d{1,2}\s+[A-Za-z]{3,9}\.?\s+\d{4})\s+",
    r"(?P<desc>\S.*?)\s+",
    r"(?P<debit>[€$£]?\d[\d,]*\.\d{2})\s+",
    r"(?P<credit>[€$£]?\d[\d,]*\.\d{2})\b"
);

/// A compiled record grammar.
#[derive(Debug, Clone)]
pub struct FormatSpec {
    name: String,
    pattern: Regex,
    layout: AmountLayout,
}

impl FormatSpec {
    /// Compile a grammar. The pattern must define the named groups its
    /// layout needs: `date`, `desc`, and `amount` or `debit` + `credit`.
    pub fn new(name: impl Into<String>, pattern: &str, layout: AmountLayout) -> Result<Self> {
        let name = name.into();
        let pattern = Regex::new(pattern).map_err(|e| Error::invalid_format(&name, e.to_string()))?;

        let groups: Vec<&str> = pattern.capture_names().flatten().collect();
        for required in layout.required_groups() {
            if !groups.contains(required) {
                return Err(Error::invalid_format(
                    &name,
                    format!("missing capture group `{required}`"),
                ));
            }
        }

        Ok(Self {
            name,
            pattern,
            layout,
        })
    }

    /// Format A: `<DD/MM> <description> <signed amount>`.
    pub fn signed_day_month() -> Result<Self> {
        Self::new(SIGNED_DAY_MONTH, SIGNED_DAY_MONTH_PATTERN, AmountLayout::Signed)
    }

    /// Format B: `<D MMM YYYY> <description> <debit> <credit>`.
    pub fn named_month_columns() -> Result<Self> {
        Self::new(
            NAMED_MONTH_COLUMNS,
            NAMED_MONTH_COLUMNS_PATTERN,
            AmountLayout::DebitCredit,
        )
    }

    /// Look up a built-in grammar by name.
    pub fn builtin(name: &str) -> Result<Self> {
        match name {
            SIGNED_DAY_MONTH => Self::signed_day_month(),
            NAMED_MONTH_COLUMNS => Self::named_month_columns(),
            other => Err(Error::invalid_format(other, "unknown built-in format")),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> AmountLayout {
        self.layout
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Convert one regex match into raw fields. Amount groups are parsed
    /// here, so a malformed group fails the whole match.
    pub(crate) fn raw_match(&self, caps: &Captures<'_>) -> Result<RawMatch> {
        let date = caps["date"].trim().to_string();
        let description = caps["desc"].split_whitespace().collect::<Vec<_>>().join(" ");

        let (debit, credit) = match self.layout {
            AmountLayout::Signed => {
                let amount = parse_amount(&caps["amount"])?;
                if amount.is_sign_negative() {
                    (amount.abs(), Decimal::ZERO)
                } else {
                    (Decimal::ZERO, amount)
                }
            }
            AmountLayout::DebitCredit => (
                parse_amount(&caps["debit"])?.abs(),
                parse_amount(&caps["credit"])?.abs(),
            ),
        };

        Ok(RawMatch::new(date, description, debit, credit))
    }
}
