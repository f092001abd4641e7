//! Record store port.
//!
//! The document store is an external collaborator. The core only depends on
//! this trait; the query helpers are provided methods so every adapter gets
//! the same history, supersede and budget-fallback semantics.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::month::MonthKey;
use crate::records::{BudgetRecord, DashboardRecord, ProgressRecord};

/// Optional month/year filter for dashboard history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardFilter {
    /// Calendar month number, 1-12
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl DashboardFilter {
    pub fn matches(&self, record: &DashboardRecord) -> bool {
        self.month.is_none_or(|m| record.statement_month.month() == m)
            && self.year.is_none_or(|y| record.statement_month.year() == y)
    }
}

/// Collection-level persistence for the pipeline's records.
pub trait RecordStore {
    /// Insert a dashboard, returning it with its assigned id.
    fn insert_dashboard(&mut self, record: DashboardRecord) -> Result<DashboardRecord>;

    /// All dashboards of a user, in insertion order.
    fn dashboards(&self, user_id: &str) -> Result<Vec<DashboardRecord>>;

    /// Dashboard by id.
    fn dashboard(&self, id: &str) -> Result<Option<DashboardRecord>>;

    /// Insert or replace the budget keyed by `(user_id, month)`.
    fn upsert_budget(&mut self, budget: BudgetRecord) -> Result<()>;

    /// All budgets of a user.
    fn budgets(&self, user_id: &str) -> Result<Vec<BudgetRecord>>;

    /// Insert a progress record, returning it with its assigned id.
    fn insert_progress(&mut self, record: ProgressRecord) -> Result<ProgressRecord>;

    /// All progress records of a user, in insertion order.
    fn progress_records(&self, user_id: &str) -> Result<Vec<ProgressRecord>>;

    /// Dashboard history, newest first, filtered by month and/or year.
    fn dashboard_history(
        &self,
        user_id: &str,
        filter: &DashboardFilter,
    ) -> Result<Vec<DashboardRecord>> {
        let mut out: Vec<_> = self
            .dashboards(user_id)?
            .into_iter()
            .filter(|d| filter.matches(d))
            .collect();
        // Stable sort keeps insertion order for equal timestamps; reverse makes it newest first.
        out.sort_by_key(|d| d.created_at);
        out.reverse();
        Ok(out)
    }

    /// The most recent dashboard for a user and month; older uploads for the
    /// same month are superseded.
    fn latest_dashboard(&self, user_id: &str, month: MonthKey) -> Result<Option<DashboardRecord>> {
        let filter = DashboardFilter {
            month: Some(month.month()),
            year: Some(month.year()),
        };
        Ok(self.dashboard_history(user_id, &filter)?.into_iter().next())
    }

    fn budget(&self, user_id: &str, month: MonthKey) -> Result<Option<BudgetRecord>> {
        Ok(self
            .budgets(user_id)?
            .into_iter()
            .find(|b| b.month == month))
    }

    /// Budget for `month`, or the latest budget before it.
    fn budget_at_or_before(&self, user_id: &str, month: MonthKey) -> Result<Option<BudgetRecord>> {
        let found = self
            .budgets(user_id)?
            .into_iter()
            .filter(|b| b.month <= month)
            .max_by_key(|b| b.month);
        if let Some(b) = &found {
            if b.month != month {
                debug!("no budget for {month}; falling back to {}", b.month);
            }
        }
        Ok(found)
    }
}

/// In-memory store, used by tests and dry runs. Serializable so file-backed
/// adapters can persist it as one document.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStore {
    dashboards: Vec<DashboardRecord>,
    budgets: Vec<BudgetRecord>,
    progress: Vec<ProgressRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn insert_dashboard(&mut self, mut record: DashboardRecord) -> Result<DashboardRecord> {
        record.id = Some(format!("dash-{:04}", self.dashboards.len() + 1));
        self.dashboards.push(record.clone());
        Ok(record)
    }

    fn dashboards(&self, user_id: &str) -> Result<Vec<DashboardRecord>> {
        Ok(self
            .dashboards
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect())
    }

    fn dashboard(&self, id: &str) -> Result<Option<DashboardRecord>> {
        Ok(self
            .dashboards
            .iter()
            .find(|d| d.id.as_deref() == Some(id))
            .cloned())
    }

    fn upsert_budget(&mut self, budget: BudgetRecord) -> Result<()> {
        match self.budgets.iter_mut().find(|b| b.same_key(&budget)) {
            Some(existing) => *existing = budget,
            None => self.budgets.push(budget),
        }
        Ok(())
    }

    fn budgets(&self, user_id: &str) -> Result<Vec<BudgetRecord>> {
        Ok(self
            .budgets
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    fn insert_progress(&mut self, mut record: ProgressRecord) -> Result<ProgressRecord> {
        record.id = Some(format!("prog-{:04}", self.progress.len() + 1));
        self.progress.push(record.clone());
        Ok(record)
    }

    fn progress_records(&self, user_id: &str) -> Result<Vec<ProgressRecord>> {
        Ok(self
            .progress
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }
}
