//! Statement pipeline: normalize → extract → resolve → categorize → aggregate.
//!
//! Every stage is a pure function of its input and the injected
//! configuration, so processing the same text twice yields equal results.

use chrono::{DateTime, Utc};
use log::{debug, info};
use smartpocket_core::{DashboardRecord, MonthKey, Result, Transaction};
use smartpocket_ingest::{FormatSpec, LineCorpus, RawMatch, extract_transactions, statement_month};

use crate::aggregate::{StatementSummary, aggregate};
use crate::category_rules::CategoryTable;
use crate::resolver::ResolverRules;

/// Configured pipeline for one statement format.
#[derive(Debug, Clone)]
pub struct StatementPipeline {
    format: FormatSpec,
    rules: ResolverRules,
    categories: CategoryTable,
}

impl StatementPipeline {
    pub fn new(format: FormatSpec, rules: ResolverRules, categories: CategoryTable) -> Self {
        Self {
            format,
            rules,
            categories,
        }
    }

    /// Default resolver markers and category table.
    pub fn with_defaults(format: FormatSpec) -> Self {
        Self::new(format, ResolverRules::default(), CategoryTable::default())
    }

    pub fn format(&self) -> &FormatSpec {
        &self.format
    }

    pub fn rules(&self) -> &ResolverRules {
        &self.rules
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    /// Resolve direction and categorize. Records the cascade discards are skipped.
    pub fn transactions(&self, raws: &[RawMatch]) -> Vec<Transaction> {
        raws.iter()
            .filter_map(|raw| {
                let tx = self.rules.resolve(raw);
                if tx.is_none() {
                    debug!("discarding internal transfer: {}", raw.description);
                }
                tx
            })
            .map(|tx| self.categories.apply(tx))
            .collect()
    }

    /// Run the whole pipeline over extracted statement text.
    ///
    /// The statement month is derived from the first extracted record.
    /// `year_hint` is only needed for formats whose dates carry no year.
    pub fn process(&self, text: &str, year_hint: Option<i32>) -> Result<ProcessedStatement> {
        let corpus = LineCorpus::new(text);
        let normalized = corpus.to_text();

        let raws = extract_transactions(&normalized, &self.format)?;
        let month = statement_month(&raws[0].date, year_hint)?;

        let transactions = self.transactions(&raws);
        let discarded = raws.len() - transactions.len();
        let summary = aggregate(&transactions);

        info!(
            "[{}] statement {}: {} transactions ({} discarded), out {} in {}",
            self.format.name(),
            month,
            transactions.len(),
            discarded,
            summary.total_outcome,
            summary.total_income
        );

        Ok(ProcessedStatement {
            statement_month: month,
            transactions,
            summary,
            discarded,
        })
    }
}

/// Output of [`StatementPipeline::process`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedStatement {
    pub statement_month: MonthKey,
    /// Resolved transactions in statement order
    pub transactions: Vec<Transaction>,
    pub summary: StatementSummary,
    /// Records dropped by the resolver cascade
    pub discarded: usize,
}

impl ProcessedStatement {
    pub fn income(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|t| t.is_income())
    }

    pub fn outcome(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|t| t.is_expense())
    }

    /// Package as a dashboard ready for storage. The store assigns the id.
    pub fn into_dashboard(self, user_id: impl Into<String>, created_at: DateTime<Utc>) -> DashboardRecord {
        let (income_list, outcome_list): (Vec<_>, Vec<_>) =
            self.transactions.into_iter().partition(|t| t.is_income());
        DashboardRecord {
            id: None,
            user_id: user_id.into(),
            statement_month: self.statement_month,
            income_list,
            outcome_list,
            total_income: self.summary.total_income,
            total_outcome: self.summary.total_outcome,
            net_balance: self.summary.net_balance,
            category_totals: self.summary.category_totals,
            created_at,
        }
    }
}
