//! Error type shared by the statement pipeline crates

use thiserror::Error;

use crate::month::MonthKey;

/// Core library error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The statement text contained no recognizable transaction records.
    #[error("no transactions found in statement text")]
    NoTransactions,

    #[error("malformed amount: {0:?}")]
    MalformedAmount(String),

    #[error("unknown date format: {0:?}")]
    UnknownDateFormat(String),

    #[error("invalid month (expected YYYY-MM): {0:?}")]
    InvalidMonth(String),

    #[error("invalid statement format {name}: {reason}")]
    InvalidFormat { name: String, reason: String },

    #[error("no budget for user {user_id} at or before {month}")]
    BudgetNotFound { user_id: String, month: MonthKey },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(String),
}

impl Error {
    /// Create an invalid format error
    pub fn invalid_format(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
