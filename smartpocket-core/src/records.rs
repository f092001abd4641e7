//! Persisted record shapes: dashboards, budgets and progress reports.
//!
//! Field names serialize in camelCase so the document store receives the
//! records unchanged.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::month::MonthKey;
use crate::transaction::Transaction;

/// Result of one successful statement upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRecord {
    /// Assigned by the store on insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub statement_month: MonthKey,
    pub income_list: Vec<Transaction>,
    pub outcome_list: Vec<Transaction>,
    pub total_income: Decimal,
    pub total_outcome: Decimal,
    pub net_balance: Decimal,
    pub category_totals: BTreeMap<String, Decimal>,
    pub created_at: DateTime<Utc>,
}

/// Planned spend for one user and month. At most one per `(user_id, month)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRecord {
    pub user_id: String,
    pub month: MonthKey,
    pub total_budget: Decimal,
    #[serde(default)]
    pub category_budgets: BTreeMap<String, Decimal>,
}

impl BudgetRecord {
    pub fn new(user_id: impl Into<String>, month: MonthKey, total_budget: Decimal) -> Self {
        Self {
            user_id: user_id.into(),
            month,
            total_budget,
            category_budgets: BTreeMap::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>, amount: Decimal) -> Self {
        self.category_budgets.insert(category.into(), amount);
        self
    }

    /// Whether this budget is keyed the same as `other`.
    pub fn same_key(&self, other: &BudgetRecord) -> bool {
        self.user_id == other.user_id && self.month == other.month
    }
}

/// Actual versus planned spend for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryComparison {
    pub category: String,
    pub current: Decimal,
    pub budget: Decimal,
    /// `current - budget`; positive means over budget
    pub over_under: Decimal,
}

/// A saved budget comparison for one dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_id: Option<String>,
    pub statement_month: MonthKey,
    /// Month of the budget actually compared against; earlier than
    /// `statement_month` when the statement month had no budget of its own.
    pub budget_month: MonthKey,
    pub current_total: Decimal,
    pub budget_total: Decimal,
    pub overall_over_under: Decimal,
    pub categories: Vec<CategoryComparison>,
    pub created_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// True when actual spend did not exceed the budget.
    pub fn within_budget(&self) -> bool {
        self.overall_over_under <= Decimal::ZERO
    }
}
