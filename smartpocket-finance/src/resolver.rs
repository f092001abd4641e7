//! Direction resolution: raw statement columns to a signed amount.
//!
//! Statement columns say "money out" or "money in" by position, but some
//! descriptions override that: top-ups are always income, transfers follow
//! their wording, and internal pocket moves are not transactions at all.
//! Rules are checked in order and the first match wins:
//!
//! 1. internal transfer (`pocket`)  → discarded
//! 2. top-up                        → `+magnitude`
//! 3. inbound transfer              → `+|magnitude|`
//! 4. outbound transfer             → `-|magnitude|`
//! 5. regular                       → `-debit` if debit > 0, else `+credit`

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smartpocket_core::Transaction;
use smartpocket_ingest::RawMatch;

/// Description-driven rule kinds, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    InternalTransfer,
    TopUp,
    TransferIn,
    TransferOut,
}

impl RuleKind {
    /// Cascade order.
    pub const ORDER: [RuleKind; 4] = [
        RuleKind::InternalTransfer,
        RuleKind::TopUp,
        RuleKind::TransferIn,
        RuleKind::TransferOut,
    ];

    fn apply(&self, raw: &RawMatch) -> Resolution {
        match self {
            RuleKind::InternalTransfer => Resolution::Discarded,
            RuleKind::TopUp => Resolution::TopUp(raw.magnitude()),
            RuleKind::TransferIn => Resolution::TransferIn(raw.magnitude().abs()),
            RuleKind::TransferOut => Resolution::TransferOut(-raw.magnitude().abs()),
        }
    }
}

/// Outcome of the cascade for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Discarded,
    TopUp(Decimal),
    TransferIn(Decimal),
    TransferOut(Decimal),
    Regular(Decimal),
}

impl Resolution {
    /// Signed amount, or `None` when the record is discarded.
    pub fn amount(&self) -> Option<Decimal> {
        match *self {
            Resolution::Discarded => None,
            Resolution::TopUp(a)
            | Resolution::TransferIn(a)
            | Resolution::TransferOut(a)
            | Resolution::Regular(a) => Some(a),
        }
    }
}

/// One (predicate, handler) pair: any marker contained in the description
/// (case-insensitive) selects `kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverRule {
    pub kind: RuleKind,
    markers: Vec<String>,
}

impl ResolverRule {
    pub fn new<I, S>(kind: RuleKind, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            kind,
            markers: markers
                .into_iter()
                .map(|m| m.as_ref().trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    fn matches(&self, description_lower: &str) -> bool {
        self.markers.iter().any(|m| description_lower.contains(m.as_str()))
    }
}

/// Marker words per rule kind, as read from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverMarkers {
    pub internal_transfer: Vec<String>,
    pub top_up: Vec<String>,
    pub transfer_in: Vec<String>,
    pub transfer_out: Vec<String>,
}

impl Default for ResolverMarkers {
    fn default() -> Self {
        fn words(ws: &[&str]) -> Vec<String> {
            ws.iter().map(|w| w.to_string()).collect()
        }
        Self {
            internal_transfer: words(&["pocket"]),
            top_up: words(&[
                "top-up by",
                "apple pay top-up",
                "google pay top-up",
                "wallet top-up",
            ]),
            transfer_in: words(&["transfer from", "payment from", "received from"]),
            transfer_out: words(&["transfer to", "payment to", "sent to"]),
        }
    }
}

/// The ordered rule cascade. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverRules {
    rules: Vec<ResolverRule>,
}

impl Default for ResolverRules {
    fn default() -> Self {
        Self::from_markers(&ResolverMarkers::default())
    }
}

impl ResolverRules {
    /// Build the cascade in the fixed [`RuleKind::ORDER`].
    pub fn from_markers(markers: &ResolverMarkers) -> Self {
        let rules = RuleKind::ORDER
            .iter()
            .map(|kind| {
                let words = match kind {
                    RuleKind::InternalTransfer => &markers.internal_transfer,
                    RuleKind::TopUp => &markers.top_up,
                    RuleKind::TransferIn => &markers.transfer_in,
                    RuleKind::TransferOut => &markers.transfer_out,
                };
                ResolverRule::new(*kind, words)
            })
            .collect();
        Self { rules }
    }

    pub fn rules(&self) -> &[ResolverRule] {
        &self.rules
    }

    /// The first rule matching the description, if any.
    pub fn matching_rule(&self, description: &str) -> Option<&ResolverRule> {
        let desc = description.to_lowercase();
        self.rules.iter().find(|r| r.matches(&desc))
    }

    /// Run the cascade over one record.
    pub fn classify(&self, raw: &RawMatch) -> Resolution {
        match self.matching_rule(&raw.description) {
            Some(rule) => rule.kind.apply(raw),
            None => Resolution::Regular(regular_amount(raw)),
        }
    }

    /// Resolve a record into an uncategorized transaction, or `None` when
    /// the cascade discards it.
    pub fn resolve(&self, raw: &RawMatch) -> Option<Transaction> {
        self.classify(raw)
            .amount()
            .map(|amount| Transaction::new(raw.date.clone(), raw.description.clone(), amount))
    }
}

fn regular_amount(raw: &RawMatch) -> Decimal {
    if raw.debit > Decimal::ZERO {
        -raw.debit
    } else {
        raw.credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn out(desc: &str, amount: &str) -> RawMatch {
        RawMatch::new("03 Jan 2025", desc, d(amount), Decimal::ZERO)
    }

    fn inbound(desc: &str, amount: &str) -> RawMatch {
        RawMatch::new("03 Jan 2025", desc, Decimal::ZERO, d(amount))
    }

    #[test]
    fn test_default_order() {
        let rules = ResolverRules::default();
        let kinds: Vec<_> = rules.rules().iter().map(|r| r.kind).collect();
        assert_eq!(kinds, RuleKind::ORDER.to_vec());
    }

    #[test]
    fn test_pocket_discarded() {
        let rules = ResolverRules::default();
        assert_eq!(rules.classify(&out("Pocket Withdrawal", "20.00")), Resolution::Discarded);
        assert_eq!(rules.resolve(&inbound("To pocket EUR Savings", "20.00")), None);
    }

    #[test]
    fn test_top_up_is_income_from_either_column() {
        let rules = ResolverRules::default();
        assert_eq!(
            rules.classify(&out("Apple Pay Top-Up by *1234", "25.00")),
            Resolution::TopUp(d("25.00"))
        );
        assert_eq!(
            rules.classify(&inbound("Top-Up by *1234", "40.00")),
            Resolution::TopUp(d("40.00"))
        );
    }

    #[test]
    fn test_merchant_top_up_stays_expense() {
        let rules = ResolverRules::default();
        assert_eq!(
            rules.classify(&out("Leap Card Top-Up", "20.00")),
            Resolution::Regular(d("-20.00"))
        );
        assert_eq!(
            rules.classify(&out("Gomo top up", "15.00")),
            Resolution::Regular(d("-15.00"))
        );
    }

    #[test]
    fn test_transfer_in_positive() {
        let rules = ResolverRules::default();
        let tx = rules.resolve(&out("Transfer from Mary", "30.00")).unwrap();
        assert_eq!(tx.amount, d("30.00"));
        let tx = rules.resolve(&inbound("Transfer from Mary", "30.00")).unwrap();
        assert_eq!(tx.amount, d("30.00"));
    }

    #[test]
    fn test_transfer_out_negative() {
        let rules = ResolverRules::default();
        let raw = out("Transfer to John", "50.00");
        assert_eq!(rules.classify(&raw), Resolution::TransferOut(d("-50.00")));
        assert_eq!(rules.resolve(&raw).unwrap().amount, d("-50.00"));
    }

    #[test]
    fn test_regular_columns() {
        let rules = ResolverRules::default();
        assert_eq!(rules.resolve(&out("Tesco", "45.00")).unwrap().amount, d("-45.00"));
        assert_eq!(rules.resolve(&inbound("Refund Zara", "19.99")).unwrap().amount, d("19.99"));
    }

    #[test]
    fn test_more_specific_rule_wins_when_markers_co_occur() {
        let rules = ResolverRules::default();
        // Pocket beats everything.
        assert_eq!(
            rules.classify(&out("Transfer to pocket Holidays", "10.00")),
            Resolution::Discarded
        );
        // Top-up beats the outbound transfer wording.
        assert_eq!(
            rules.classify(&out("Transfer to wallet top-up", "10.00")),
            Resolution::TopUp(d("10.00"))
        );
        // Inbound is checked before outbound.
        assert_eq!(
            rules.classify(&out("Payment from Ann transfer to savings", "5.00")),
            Resolution::TransferIn(d("5.00"))
        );
    }

    #[test]
    fn test_zero_amount_falls_to_expense_path() {
        let rules = ResolverRules::default();
        let raw = RawMatch::new("02/11", "Card check", Decimal::ZERO, Decimal::ZERO);
        assert_eq!(rules.classify(&raw), Resolution::Regular(Decimal::ZERO));
        let tx = rules.resolve(&raw).unwrap();
        assert_eq!(tx.amount, Decimal::ZERO);
        assert!(tx.is_expense());
    }

    #[test]
    fn test_resolve_is_pure() {
        let rules = ResolverRules::default();
        let raw = out("Transfer to John", "50.00");
        let first = rules.resolve(&raw);
        for _ in 0..3 {
            assert_eq!(rules.resolve(&raw), first);
        }
    }

    #[test]
    fn test_custom_markers() {
        let markers = ResolverMarkers {
            internal_transfer: vec!["Vault".to_string()],
            top_up: vec![],
            transfer_in: vec![],
            transfer_out: vec!["  SEPA OUT ".to_string(), "".to_string()],
        };
        let rules = ResolverRules::from_markers(&markers);
        assert_eq!(rules.rules()[3].markers(), ["sepa out".to_string()]);
        assert_eq!(rules.classify(&out("Savings vault", "1.00")), Resolution::Discarded);
        // Default pocket marker no longer applies.
        assert_eq!(
            rules.classify(&out("Pocket money", "1.00")),
            Resolution::Regular(d("-1.00"))
        );
        assert_eq!(
            rules.classify(&inbound("sepa out ref 42", "3.00")),
            Resolution::TransferOut(d("-3.00"))
        );
    }
}
