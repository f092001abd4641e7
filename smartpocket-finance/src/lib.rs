//! smartpocket-finance: direction resolver, category rules, aggregation and reports

pub mod aggregate;
pub mod category_rules;
pub mod pipeline;
pub mod reports;
pub mod resolver;

pub use aggregate::{
    BetterMonth, BudgetComparison, CategoryDelta, DashboardComparison, StatementSummary, aggregate,
    better_month, compare_dashboards, compare_to_budget,
};
pub use category_rules::{CategoryRule, CategoryTable, DEFAULT_CATEGORY};
pub use pipeline::{ProcessedStatement, StatementPipeline};
pub use reports::{build_progress, compare_stored, compare_with_previous_month, record_progress};
pub use resolver::{Resolution, ResolverMarkers, ResolverRule, ResolverRules, RuleKind};
