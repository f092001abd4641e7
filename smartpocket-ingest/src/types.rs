use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Raw fields pulled out of one statement record, before direction rules.
///
/// `debit` is money out and `credit` is money in, both non-negative. The
/// extractor never yields a match where both are nonzero or both are zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMatch {
    /// Date as printed (`DD/MM` or `D MMM YYYY`)
    pub date: String,
    pub description: String,
    pub debit: Decimal,
    pub credit: Decimal,
}

impl RawMatch {
    pub fn new(
        date: impl Into<String>,
        description: impl Into<String>,
        debit: Decimal,
        credit: Decimal,
    ) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            debit,
            credit,
        }
    }

    /// Value of whichever column carries the money: debit when nonzero,
    /// otherwise credit.
    pub fn magnitude(&self) -> Decimal {
        if self.debit.is_zero() {
            self.credit
        } else {
            self.debit
        }
    }

    pub fn both_zero(&self) -> bool {
        self.debit.is_zero() && self.credit.is_zero()
    }

    pub fn both_nonzero(&self) -> bool {
        !self.debit.is_zero() && !self.credit.is_zero()
    }
}
