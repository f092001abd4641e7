//! Deterministic category rules: description keywords to a spending category.
//!
//! The table is ordered and the first category with a matching keyword wins,
//! so more specific categories must come first (`Applegreen` is fuel, not
//! an Apple purchase). Matching is a case-insensitive substring test.

use serde::{Deserialize, Serialize};
use smartpocket_core::Transaction;

pub const DEFAULT_CATEGORY: &str = "Other";

/// One row of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    fn matches(&self, description_lower: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| description_lower.contains(k.as_str()))
    }
}

/// Ordered keyword table plus the fallback category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    rules: Vec<CategoryRule>,
    default: String,
}

impl CategoryTable {
    pub fn new(rules: Vec<CategoryRule>, default: impl Into<String>) -> Self {
        // Keywords may come straight from config; normalize them here.
        let rules = rules
            .into_iter()
            .map(|r| CategoryRule::new(r.name, r.keywords))
            .collect();
        Self {
            rules,
            default: default.into(),
        }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn default_category(&self) -> &str {
        &self.default
    }

    /// Category names in evaluation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    /// Evaluation position of a category, `None` for unknown names and the default.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.name == name)
    }

    /// Category for a description. Never fails; unmatched text gets the default.
    pub fn categorize(&self, description: &str) -> &str {
        let desc = description.to_lowercase();
        self.rules
            .iter()
            .find(|r| r.matches(&desc))
            .map(|r| r.name.as_str())
            .unwrap_or(&self.default)
    }

    /// Attach a category to an expense. Income passes through untouched.
    pub fn apply(&self, tx: Transaction) -> Transaction {
        if tx.is_expense() {
            let category = self.categorize(&tx.description).to_string();
            tx.with_category(category)
        } else {
            tx
        }
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        let rules = vec![
            CategoryRule::new(
                "Transfers",
                ["transfer to", "transfer from", "sent to", "payment to", "revolut", "bank transfer"],
            ),
            CategoryRule::new(
                "Groceries",
                [
                    "tesco", "aldi", "lidl", "dunnes", "supervalu", "centra", "spar", "grocery",
                    "supermarket", "asian market",
                ],
            ),
            CategoryRule::new(
                "Transport",
                [
                    "leap card", "dublin bus", "bus eireann", "luas", "irish rail", "uber", "bolt",
                    "free now", "freenow", "taxi", "circle k", "applegreen", "parking", "toll",
                ],
            ),
            CategoryRule::new(
                "Food",
                [
                    "restaurant", "cafe", "coffee", "mcdonald", "burger king", "subway", "domino",
                    "deliveroo", "just eat", "starbucks", "costa", "takeaway", "pizza",
                ],
            ),
            CategoryRule::new(
                "Subscriptions",
                [
                    "netflix", "spotify", "prime video", "amazon prime", "disney", "icloud",
                    "youtube", "gomo", "subscription", "patreon",
                ],
            ),
            CategoryRule::new(
                "Shopping",
                [
                    "apple", "amazon", "penneys", "primark", "zara", "ikea", "argos", "currys",
                    "h&m", "nintendo",
                ],
            ),
            CategoryRule::new(
                "Rent/Utilities",
                [
                    "rent payment", "landlord", "electric", "bord gais", "flogas", "irish water",
                    "utilities", "wifi", "broadband", "virgin media",
                ],
            ),
            CategoryRule::new(
                "Education",
                [
                    "university", "college", "tuition", "school", "udemy", "coursera", "books",
                ],
            ),
        ];
        Self::new(rules, DEFAULT_CATEGORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_declared_order() {
        let table = CategoryTable::default();
        let names: Vec<_> = table.names().collect();
        assert_eq!(
            names,
            vec![
                "Transfers",
                "Groceries",
                "Transport",
                "Food",
                "Subscriptions",
                "Shopping",
                "Rent/Utilities",
                "Education",
            ]
        );
        assert_eq!(table.default_category(), "Other");
    }

    #[test]
    fn test_basic_keywords() {
        let table = CategoryTable::default();
        assert_eq!(table.categorize("TESCO STORES 3412"), "Groceries");
        assert_eq!(table.categorize("Leap Card Top-Up"), "Transport");
        assert_eq!(table.categorize("Netflix.com"), "Subscriptions");
        assert_eq!(table.categorize("Transfer to John"), "Transfers");
        assert_eq!(table.categorize("Electric Ireland"), "Rent/Utilities");
        assert_eq!(table.categorize("Udemy course"), "Education");
    }

    #[test]
    fn test_earlier_category_wins() {
        let table = CategoryTable::default();
        // Both Subscriptions and Shopping match; Subscriptions is earlier.
        assert_eq!(table.categorize("Apple Spotify bundle"), "Subscriptions");
        assert!(table.position("Subscriptions") < table.position("Shopping"));
        // Transport is checked before Shopping's "apple".
        assert_eq!(table.categorize("APPLEGREEN M50"), "Transport");
        assert_eq!(table.categorize("Apple Store Grafton"), "Shopping");
    }

    #[test]
    fn test_categorize_is_order_independent() {
        let table = CategoryTable::default();
        let descriptions = [
            "APPLEGREEN M50",
            "Apple Store Grafton",
            "Transfer to John",
            "Mystery vendor 0042",
            "Spotify P0C1D2",
            "Tesco Express",
        ];
        let forward: Vec<&str> = descriptions.iter().map(|d| table.categorize(d)).collect();
        let mut backward: Vec<&str> = descriptions.iter().rev().map(|d| table.categorize(d)).collect();
        backward.reverse();
        assert_eq!(forward, backward);

        for _ in 0..3 {
            let again: Vec<&str> = descriptions.iter().map(|d| table.categorize(d)).collect();
            assert_eq!(again, forward);
        }
        assert_eq!(
            forward,
            vec!["Transport", "Shopping", "Transfers", "Other", "Subscriptions", "Groceries"]
        );
    }

    #[test]
    fn test_unmatched_is_default() {
        let table = CategoryTable::default();
        assert_eq!(table.categorize("Mystery vendor 0042"), "Other");
        assert_eq!(table.categorize(""), "Other");
        assert_eq!(table.position("Other"), None);
    }

    #[test]
    fn test_custom_table_normalizes_keywords() {
        let table = CategoryTable::new(
            vec![CategoryRule {
                name: "Pets".to_string(),
                keywords: vec!["  PetStop ".to_string()],
            }],
            "Misc",
        );
        assert_eq!(table.rules()[0].keywords, vec!["petstop".to_string()]);
        assert_eq!(table.categorize("petstop naas"), "Pets");
        assert_eq!(table.categorize("tesco"), "Misc");
    }

    #[test]
    fn test_apply_only_categorizes_expenses() {
        let table = CategoryTable::default();
        let spend = Transaction::new("12/11", "Tesco", Decimal::new(-4500, 2));
        assert_eq!(table.apply(spend).category.as_deref(), Some("Groceries"));

        let refund = Transaction::new("12/11", "Tesco refund", Decimal::new(500, 2));
        assert_eq!(table.apply(refund).category, None);

        let zero = Transaction::new("12/11", "Card check", Decimal::ZERO);
        assert_eq!(table.apply(zero).category.as_deref(), Some("Other"));
    }
}
