//! Resolved statement transactions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A statement line after direction resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Date as printed on the statement (`12/11`, `3 Jan 2025`, ...)
    pub date: String,
    /// Human-readable description
    pub description: String,
    /// Positive = income, zero or negative = expense
    pub amount: Decimal,
    /// Spending category, set only on the expense path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Transaction {
    pub fn new(date: impl Into<String>, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            amount,
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Returns true if this is income (strictly positive amount)
    pub fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Returns true if this is on the expense path. Zero counts as an expense.
    pub fn is_expense(&self) -> bool {
        !self.is_income()
    }

    /// Get the absolute amount
    pub fn abs_amount(&self) -> Decimal {
        self.amount.abs()
    }
}
