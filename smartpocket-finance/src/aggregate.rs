//! Totals, per-category sums, budget comparison and month-over-month verdicts.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smartpocket_core::{BudgetRecord, CategoryComparison, DashboardRecord, MonthKey, Transaction};

/// Totals for one processed statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementSummary {
    pub total_income: Decimal,
    /// Sum of expense magnitudes, never negative
    pub total_outcome: Decimal,
    pub net_balance: Decimal,
    pub category_totals: BTreeMap<String, Decimal>,
}

/// Sum income and expenses. Expenses without a category count towards
/// `total_outcome` but not towards any category total.
pub fn aggregate(transactions: &[Transaction]) -> StatementSummary {
    let mut summary = StatementSummary::default();
    for tx in transactions {
        if tx.is_income() {
            summary.total_income += tx.amount;
        } else {
            let spent = tx.abs_amount();
            summary.total_outcome += spent;
            if let Some(category) = &tx.category {
                *summary
                    .category_totals
                    .entry(category.clone())
                    .or_insert(Decimal::ZERO) += spent;
            }
        }
    }
    summary.net_balance = summary.total_income - summary.total_outcome;
    summary
}

/// Spending checked against a budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetComparison {
    pub current_total: Decimal,
    pub budget_total: Decimal,
    /// Positive means overspent
    pub overall_over_under: Decimal,
    /// Sorted by category name
    pub categories: Vec<CategoryComparison>,
}

/// Compare category totals with a budget. Every category from either side
/// appears once; a missing side counts as zero.
pub fn compare_to_budget(
    category_totals: &BTreeMap<String, Decimal>,
    budget: &BudgetRecord,
) -> BudgetComparison {
    let names: BTreeSet<&String> = category_totals
        .keys()
        .chain(budget.category_budgets.keys())
        .collect();

    let categories = names
        .into_iter()
        .map(|name| {
            let current = category_totals.get(name).copied().unwrap_or_default();
            let planned = budget.category_budgets.get(name).copied().unwrap_or_default();
            CategoryComparison {
                category: name.clone(),
                current,
                budget: planned,
                over_under: current - planned,
            }
        })
        .collect();

    let current_total: Decimal = category_totals.values().sum();
    BudgetComparison {
        current_total,
        budget_total: budget.total_budget,
        overall_over_under: current_total - budget.total_budget,
        categories,
    }
}

/// Which of two periods spent less.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetterMonth {
    Current,
    Previous,
}

/// `Current` only when it spent strictly less; ties go to `Previous`.
pub fn better_month(current: &DashboardRecord, previous: &DashboardRecord) -> BetterMonth {
    if current.total_outcome < previous.total_outcome {
        BetterMonth::Current
    } else {
        BetterMonth::Previous
    }
}

/// One category across two dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDelta {
    pub category: String,
    pub current: Decimal,
    pub previous: Decimal,
}

impl CategoryDelta {
    /// Positive when the current period spent more.
    pub fn change(&self) -> Decimal {
        self.current - self.previous
    }
}

/// Side-by-side view of two dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardComparison {
    pub current_month: MonthKey,
    pub previous_month: MonthKey,
    pub current_outcome: Decimal,
    pub previous_outcome: Decimal,
    pub categories: Vec<CategoryDelta>,
    pub better: BetterMonth,
}

pub fn compare_dashboards(current: &DashboardRecord, previous: &DashboardRecord) -> DashboardComparison {
    let names: BTreeSet<&String> = current
        .category_totals
        .keys()
        .chain(previous.category_totals.keys())
        .collect();

    let categories = names
        .into_iter()
        .map(|name| CategoryDelta {
            category: name.clone(),
            current: current.category_totals.get(name).copied().unwrap_or_default(),
            previous: previous.category_totals.get(name).copied().unwrap_or_default(),
        })
        .collect();

    DashboardComparison {
        current_month: current.statement_month,
        previous_month: previous.statement_month,
        current_outcome: current.total_outcome,
        previous_outcome: previous.total_outcome,
        categories,
        better: better_month(current, previous),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn spend(desc: &str, amount: &str, category: &str) -> Transaction {
        Transaction::new("01/11", desc, d(amount)).with_category(category)
    }

    fn dashboard(month: &str, outcome: &str, totals: &[(&str, &str)]) -> DashboardRecord {
        DashboardRecord {
            id: None,
            user_id: "u1".to_string(),
            statement_month: month.parse().unwrap(),
            income_list: vec![],
            outcome_list: vec![],
            total_income: Decimal::ZERO,
            total_outcome: d(outcome),
            net_balance: -d(outcome),
            category_totals: totals
                .iter()
                .map(|(k, v)| (k.to_string(), d(v)))
                .collect(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_aggregate_totals() {
        let txs = vec![
            Transaction::new("01/11", "Salary", d("2000.00")),
            spend("Tesco", "-45.00", "Groceries"),
            spend("Lidl", "-5.50", "Groceries"),
            spend("Netflix", "-12.99", "Subscriptions"),
        ];
        let s = aggregate(&txs);
        assert_eq!(s.total_income, d("2000.00"));
        assert_eq!(s.total_outcome, d("63.49"));
        assert_eq!(s.net_balance, d("1936.51"));
        assert_eq!(s.category_totals["Groceries"], d("50.50"));
        assert_eq!(s.category_totals["Subscriptions"], d("12.99"));
    }

    #[test]
    fn test_category_totals_sum_to_outcome() {
        let txs = vec![
            spend("a", "-1.10", "A"),
            spend("b", "-2.20", "B"),
            spend("c", "-3.30", "A"),
            spend("zero", "0", "Other"),
        ];
        let s = aggregate(&txs);
        let sum: Decimal = s.category_totals.values().sum();
        assert_eq!(sum, s.total_outcome);
        assert_eq!(s.category_totals["Other"], Decimal::ZERO);
    }

    #[test]
    fn test_aggregate_is_additive() {
        let a = vec![spend("a", "-10.00", "A"), Transaction::new("x", "Pay", d("5.00"))];
        let b = vec![spend("b", "-2.50", "A"), spend("c", "-4.00", "B")];
        let joined: Vec<_> = a.iter().chain(b.iter()).cloned().collect();

        let (sa, sb, sj) = (aggregate(&a), aggregate(&b), aggregate(&joined));
        assert_eq!(sj.total_income, sa.total_income + sb.total_income);
        assert_eq!(sj.total_outcome, sa.total_outcome + sb.total_outcome);
        assert_eq!(sj.category_totals["A"], d("12.50"));
    }

    #[test]
    fn test_empty_is_zero() {
        let s = aggregate(&[]);
        assert_eq!(s, StatementSummary::default());
    }

    #[test]
    fn test_summary_json_shape() {
        let s = aggregate(&[spend("Tesco", "-4.50", "Groceries")]);
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["totalOutcome"], "4.50");
        assert_eq!(v["categoryTotals"]["Groceries"], "4.50");
        assert_eq!(serde_json::to_value(BetterMonth::Previous).unwrap(), "previous");
    }

    #[test]
    fn test_budget_comparison_union() {
        let totals: BTreeMap<_, _> = [("Groceries".to_string(), d("100"))].into();
        let budget = BudgetRecord::new("u1", "2025-01".parse().unwrap(), d("200"))
            .with_category("Groceries", d("80"))
            .with_category("Transport", d("50"));

        let cmp = compare_to_budget(&totals, &budget);
        assert_eq!(
            cmp.categories,
            vec![
                CategoryComparison {
                    category: "Groceries".to_string(),
                    current: d("100"),
                    budget: d("80"),
                    over_under: d("20"),
                },
                CategoryComparison {
                    category: "Transport".to_string(),
                    current: d("0"),
                    budget: d("50"),
                    over_under: d("-50"),
                },
            ]
        );
        assert_eq!(cmp.current_total, d("100"));
        assert_eq!(cmp.overall_over_under, d("-100"));
    }

    #[test]
    fn test_better_month_tie_goes_to_previous() {
        let cur = dashboard("2025-02", "300.00", &[]);
        let prev = dashboard("2025-01", "300.00", &[]);
        assert_eq!(better_month(&cur, &prev), BetterMonth::Previous);

        let cheaper = dashboard("2025-02", "299.99", &[]);
        assert_eq!(better_month(&cheaper, &prev), BetterMonth::Current);
    }

    #[test]
    fn test_compare_dashboards() {
        let cur = dashboard("2025-02", "150.00", &[("Food", "50"), ("Groceries", "100")]);
        let prev = dashboard("2025-01", "200.00", &[("Groceries", "120"), ("Transport", "80")]);

        let cmp = compare_dashboards(&cur, &prev);
        assert_eq!(cmp.better, BetterMonth::Current);
        assert_eq!(cmp.current_month.to_string(), "2025-02");
        let names: Vec<_> = cmp.categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Food", "Groceries", "Transport"]);
        assert_eq!(cmp.categories[1].change(), d("-20"));
        assert_eq!(cmp.categories[2].current, Decimal::ZERO);
    }
}
