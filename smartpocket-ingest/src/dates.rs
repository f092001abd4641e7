//! Statement date parsing and month-bucket derivation.
//!
//! Statements print dates as `12/11`, `12/11/2024`, `3 Jan 2025`,
//! `3 January 2025` or with non-standard abbreviations such as `3 Sept 2025`.

use chrono::NaiveDate;
use smartpocket_core::{Error, MonthKey, Result};

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Map a month word to its standard 3-letter form (`Sept` → `Sep`,
/// `January` → `Jan`). The word must be a prefix of the full month name and
/// at least 3 letters long.
pub fn normalize_month_name(word: &str) -> Option<&'static str> {
    let w = word.trim().trim_end_matches('.').to_ascii_lowercase();
    if w.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|name| name.starts_with(&w))
        .map(|i| MONTH_ABBR[i])
}

fn parse_year(s: &str) -> Option<i32> {
    let y: i32 = s.parse().ok()?;
    match s.len() {
        2 => Some(2000 + y),
        4 => Some(y),
        _ => None,
    }
}

/// `DD/MM/YYYY`, `DD/MM/YY`, or `DD/MM` with `year_hint`.
fn parse_day_month(s: &str, year_hint: Option<i32>) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('/').collect();
    let (d, m, year) = match parts.as_slice() {
        [d, m] => (*d, *m, year_hint?),
        [d, m, y] => (*d, *m, parse_year(y)?),
        _ => return None,
    };
    let day: u32 = d.parse().ok()?;
    let month: u32 = m.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `D MMM YYYY` with any recognizable month word.
fn parse_named_month(tokens: &[&str]) -> Option<NaiveDate> {
    let [day, month, year] = tokens else {
        return None;
    };
    let abbr = normalize_month_name(month)?;
    let normalized = format!("{day} {abbr} {year}");
    NaiveDate::parse_from_str(&normalized, "%d %b %Y").ok()
}

/// Parse a statement date. `year_hint` is only consulted for `DD/MM` dates,
/// which carry no year.
pub fn parse_statement_date(raw: &str, year_hint: Option<i32>) -> Result<NaiveDate> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    let parsed = match tokens.as_slice() {
        [single] if single.contains('/') => parse_day_month(single, year_hint),
        [_, _, _] => parse_named_month(&tokens),
        _ => None,
    };
    parsed.ok_or_else(|| Error::UnknownDateFormat(raw.to_string()))
}

/// Derive the `YYYY-MM` bucket of a statement date.
pub fn statement_month(raw: &str, year_hint: Option<i32>) -> Result<MonthKey> {
    let date = parse_statement_date(raw, year_hint)?;
    MonthKey::from_date(date).map_err(|_| Error::UnknownDateFormat(raw.to_string()))
}
