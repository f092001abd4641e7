//! Record extraction: statement text to [`RawMatch`] values.

use log::{debug, warn};
use smartpocket_core::{Error, Result};

use crate::formats::FormatSpec;
use crate::types::RawMatch;

/// Lazily yield every usable record in document order.
///
/// Matches are non-overlapping. A match is dropped, and scanning continues,
/// when an amount group fails to parse, when both columns are zero (not a
/// real transaction), or when both columns are nonzero (direction unknown).
pub fn raw_matches<'a>(text: &'a str, format: &'a FormatSpec) -> impl Iterator<Item = RawMatch> + 'a {
    format
        .pattern()
        .captures_iter(text)
        .filter_map(move |caps| match format.raw_match(&caps) {
            Ok(m) if m.both_zero() => {
                debug!("[{}] discarding zero-amount row: {}", format.name(), &caps[0]);
                None
            }
            Ok(m) if m.both_nonzero() => {
                warn!(
                    "[{}] discarding row with both debit and credit set: {}",
                    format.name(),
                    &caps[0]
                );
                None
            }
            Ok(m) => Some(m),
            Err(e) => {
                warn!("[{}] skipping row {:?}: {}", format.name(), &caps[0], e);
                None
            }
        })
}

/// Extract all records from statement text.
///
/// Returns [`Error::NoTransactions`] when nothing usable was found, which
/// usually means the statement layout is not the one `format` describes.
pub fn extract_transactions(text: &str, format: &FormatSpec) -> Result<Vec<RawMatch>> {
    let out: Vec<RawMatch> = raw_matches(text, format).collect();
    if out.is_empty() {
        return Err(Error::NoTransactions);
    }
    debug!("[{}] extracted {} records", format.name(), out.len());
    Ok(out)
}
