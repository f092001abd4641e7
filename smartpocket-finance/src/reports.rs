//! Stored-record reports: budget progress for a dashboard and
//! dashboard-to-dashboard comparison.

use chrono::{DateTime, Utc};
use log::info;
use smartpocket_core::{
    BudgetRecord, DashboardRecord, Error, MonthKey, ProgressRecord, RecordStore, Result,
};

use crate::aggregate::{DashboardComparison, compare_dashboards, compare_to_budget};

/// Build (but do not store) a progress record for a dashboard against a budget.
pub fn build_progress(
    dashboard: &DashboardRecord,
    budget: &BudgetRecord,
    created_at: DateTime<Utc>,
) -> ProgressRecord {
    let cmp = compare_to_budget(&dashboard.category_totals, budget);
    ProgressRecord {
        id: None,
        user_id: dashboard.user_id.clone(),
        dashboard_id: dashboard.id.clone(),
        statement_month: dashboard.statement_month,
        budget_month: budget.month,
        current_total: cmp.current_total,
        budget_total: cmp.budget_total,
        overall_over_under: cmp.overall_over_under,
        categories: cmp.categories,
        created_at,
    }
}

fn load_dashboard<S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<DashboardRecord> {
    store
        .dashboard(id)?
        .ok_or_else(|| Error::NotFound(format!("dashboard {id}")))
}

/// Compare a stored dashboard with the budget for its month, or the latest
/// budget before it, and persist the result.
pub fn record_progress<S: RecordStore + ?Sized>(
    store: &mut S,
    dashboard_id: &str,
    created_at: DateTime<Utc>,
) -> Result<ProgressRecord> {
    let dashboard = load_dashboard(store, dashboard_id)?;
    let budget = store
        .budget_at_or_before(&dashboard.user_id, dashboard.statement_month)?
        .ok_or_else(|| Error::BudgetNotFound {
            user_id: dashboard.user_id.clone(),
            month: dashboard.statement_month,
        })?;

    let record = store.insert_progress(build_progress(&dashboard, &budget, created_at))?;
    info!(
        "progress for {} ({}) against budget {}: over/under {}",
        dashboard.statement_month, dashboard_id, budget.month, record.overall_over_under
    );
    Ok(record)
}

/// Compare two stored dashboards; `current_id` is the period being judged.
pub fn compare_stored<S: RecordStore + ?Sized>(
    store: &S,
    current_id: &str,
    previous_id: &str,
) -> Result<DashboardComparison> {
    let current = load_dashboard(store, current_id)?;
    let previous = load_dashboard(store, previous_id)?;
    Ok(compare_dashboards(&current, &previous))
}

/// Compare the latest dashboard of `month` with the latest one of the month before.
pub fn compare_with_previous_month<S: RecordStore + ?Sized>(
    store: &S,
    user_id: &str,
    month: MonthKey,
) -> Result<DashboardComparison> {
    let latest = |m: MonthKey| {
        store
            .latest_dashboard(user_id, m)?
            .ok_or_else(|| Error::NotFound(format!("dashboard for {user_id} in {m}")))
    };
    let current = latest(month)?;
    let previous = latest(month.previous())?;
    Ok(compare_dashboards(&current, &previous))
}
