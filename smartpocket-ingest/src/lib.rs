//! smartpocket-ingest: statement text normalization, record grammars and extraction.

pub mod amount;
pub mod dates;
pub mod extract;
pub mod formats;
pub mod normalize;
pub mod types;

pub use amount::parse_amount;
pub use dates::{normalize_month_name, parse_statement_date, statement_month};
pub use extract::{extract_transactions, raw_matches};
pub use formats::{AmountLayout, BUILTIN_FORMATS, FormatSpec};
pub use normalize::{LineCorpus, join_pages};
pub use types::RawMatch;
