//! smartpocket-core: record types, month keys, errors and the record store port

pub mod error;
pub mod month;
pub mod records;
pub mod store;
pub mod transaction;

pub use error::{Error, Result};
pub use month::MonthKey;
pub use records::{BudgetRecord, CategoryComparison, DashboardRecord, ProgressRecord};
pub use store::{DashboardFilter, MemoryStore, RecordStore};
pub use transaction::Transaction;
