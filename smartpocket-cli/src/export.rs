//! CSV export of a dashboard's transactions.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use smartpocket_core::{DashboardRecord, Transaction};
use std::io::Write;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    month: String,
    date: &'a str,
    description: &'a str,
    direction: &'static str,
    amount: Decimal,
    category: &'a str,
}

impl<'a> ExportRow<'a> {
    fn new(d: &DashboardRecord, tx: &'a Transaction, direction: &'static str) -> Self {
        Self {
            month: d.statement_month.to_string(),
            date: &tx.date,
            description: &tx.description,
            direction,
            amount: tx.amount,
            category: tx.category.as_deref().unwrap_or(""),
        }
    }
}

/// Write income rows then outcome rows, each in statement order.
pub fn write_transactions_csv<W: Write>(d: &DashboardRecord, out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    let rows = d
        .income_list
        .iter()
        .map(|tx| ExportRow::new(d, tx, "income"))
        .chain(d.outcome_list.iter().map(|tx| ExportRow::new(d, tx, "outcome")));
    for row in rows {
        wtr.serialize(row).context("write CSV row")?;
    }
    wtr.flush().context("flush CSV")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_csv_rows() {
        let d = DashboardRecord {
            id: Some("dash-0001".to_string()),
            user_id: "u1".to_string(),
            statement_month: "2025-01".parse().unwrap(),
            income_list: vec![Transaction::new("02 Jan 2025", "Salary, ACME", Decimal::new(245000, 2))],
            outcome_list: vec![
                Transaction::new("03 Jan 2025", "Tesco", Decimal::new(-4520, 2)).with_category("Groceries"),
            ],
            total_income: Decimal::new(245000, 2),
            total_outcome: Decimal::new(4520, 2),
            net_balance: Decimal::new(240480, 2),
            category_totals: [("Groceries".to_string(), Decimal::new(4520, 2))].into(),
            created_at: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
        };

        let mut buf = Vec::new();
        write_transactions_csv(&d, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "month,date,description,direction,amount,category");
        assert_eq!(lines[1], "2025-01,02 Jan 2025,\"Salary, ACME\",income,2450.00,");
        assert_eq!(lines[2], "2025-01,03 Jan 2025,Tesco,outcome,-45.20,Groceries");
        assert_eq!(lines.len(), 3);
    }
}
