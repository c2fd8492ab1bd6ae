//! Intent classifier
//!
//! The extractor returns a free-form intent tag. This maps it onto the
//! computations the assistant knows how to check:
//! - TotalSpend: sum of outflows ("total_spend", "spesa_totale"...)
//! - TotalIncome: sum of inflows ("total_income", "entrate_totali"...)
//! - Other: anything else, left to the model
//!
//! Only whole tags are recognized. "average_daily_spend" mentions spend but
//! asks for a different number, so it stays Other.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentKind {
    TotalSpend,
    TotalIncome,
    Other(String),
}

/// Normalized tags that mean "sum every outflow in the period"
const TOTAL_SPEND_TAGS: &[&str] = &[
    "total_spend", "total_spending", "total_spent", "total_expense", "total_expenses",
    "total_outflow", "total_outflows", "spend", "spending", "expenses",
    "spesa_totale", "spese_totali", "uscite_totali", "spesa", "spese",
];

/// Normalized tags that mean "sum every inflow in the period"
const TOTAL_INCOME_TAGS: &[&str] = &[
    "total_income", "total_inflow", "total_inflows", "total_earnings", "income",
    "entrate_totali", "entrata_totale", "entrate",
];

impl IntentKind {
    /// Classify an intent tag such as "total_spend" or "Spesa Totale"
    pub fn classify(tag: &str) -> IntentKind {
        let normalized = normalize(tag);

        if TOTAL_SPEND_TAGS.contains(&normalized.as_str()) {
            IntentKind::TotalSpend
        } else if TOTAL_INCOME_TAGS.contains(&normalized.as_str()) {
            IntentKind::TotalIncome
        } else {
            IntentKind::Other(normalized)
        }
    }

    pub fn is_spend(&self) -> bool {
        matches!(self, IntentKind::TotalSpend)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, IntentKind::Other(_))
    }
}

/// Lowercase, with any run of separators collapsed to one underscore
fn normalize(tag: &str) -> String {
    tag.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntentKind::TotalSpend => write!(f, "total_spend"),
            IntentKind::TotalIncome => write!(f, "total_income"),
            IntentKind::Other(tag) => write!(f, "{}", tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spend_tags() {
        let cases = vec![
            "total_spend",
            "spesa_totale",
            "Total Spending",
            "total-expenses",
            " SPESE ",
        ];

        for c in cases {
            assert_eq!(IntentKind::classify(c), IntentKind::TotalSpend, "{}", c);
        }
    }

    #[test]
    fn test_income_tags() {
        for c in ["total_income", "entrate_totali", "Income"] {
            assert_eq!(IntentKind::classify(c), IntentKind::TotalIncome, "{}", c);
        }
    }

    #[test]
    fn test_partial_keyword_matches_stay_other() {
        for c in [
            "average_daily_spend",
            "net_income_minus_spend",
            "spend_change_vs_last_week",
            "largest_expense",
            "salary",
        ] {
            let kind = IntentKind::classify(c);
            assert_eq!(kind, IntentKind::Other(c.to_string()), "{}", c);
            assert!(!kind.is_known());
        }
    }

    #[test]
    fn test_unknown_tags_are_kept() {
        assert_eq!(
            IntentKind::classify(" Average Transaction "),
            IntentKind::Other("average_transaction".to_string())
        );
        assert_eq!(IntentKind::classify(""), IntentKind::Other(String::new()));
    }

    #[test]
    fn test_display_is_canonical_tag() {
        assert_eq!(IntentKind::classify("spesa_totale").to_string(), "total_spend");
    }
}
