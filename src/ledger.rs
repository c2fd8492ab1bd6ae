//! Transaction store
//!
//! A fixed ledger compiled into the binary. It is built once on first use
//! and shared read-only for the life of the process.

use crate::models::{Direction, Transaction};
use crate::period::PeriodWindow;
use crate::Result;
use chrono::NaiveDate;
use lazy_static::lazy_static;

/// (year, month, day, direction, category, amount)
type Row = (i32, u32, u32, Direction, &'static str, f64);

const SAMPLE_ROWS: &[Row] = &[
    (2025, 6, 24, Direction::Outflow, "Food", 25.0),
    (2025, 6, 26, Direction::Outflow, "Leisure", 40.0),
    (2025, 6, 30, Direction::Outflow, "Food", 30.0),
    (2025, 7, 1, Direction::Inflow, "Salary", 1200.0),
    (2025, 7, 1, Direction::Outflow, "Groceries", 15.0),
    (2025, 7, 2, Direction::Outflow, "Transport", 10.0),
    (2025, 7, 3, Direction::Outflow, "Bar", 5.0),
    (2025, 7, 3, Direction::Outflow, "Restaurant", 20.0),
];

lazy_static! {
    static ref SAMPLE_LEDGER: Ledger = Ledger::from_rows(SAMPLE_ROWS);
}

/// Ordered, immutable sequence of transactions
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    /// The ledger shipped with the assistant
    pub fn sample() -> &'static Ledger {
        &SAMPLE_LEDGER
    }

    fn from_rows(rows: &[Row]) -> Self {
        let transactions = rows
            .iter()
            .filter_map(|(y, m, d, direction, category, amount)| {
                NaiveDate::from_ymd_opt(*y, *m, *d)
                    .map(|date| Transaction::new(date, *direction, category, *amount))
            })
            .collect();

        Self { transactions }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Sum of outflow amounts dated inside the window
    pub fn total_outflow(&self, window: &PeriodWindow) -> f64 {
        self.transactions
            .iter()
            .filter(|tx| tx.is_outflow() && window.contains(tx.date))
            .map(|tx| tx.amount)
            .sum()
    }

    /// Sum of inflow amounts dated inside the window
    pub fn total_inflow(&self, window: &PeriodWindow) -> f64 {
        self.transactions
            .iter()
            .filter(|tx| !tx.is_outflow() && window.contains(tx.date))
            .map(|tx| tx.amount)
            .sum()
    }

    /// Upper bound for any spend aggregate over this ledger
    pub fn all_time_outflow(&self) -> f64 {
        self.transactions
            .iter()
            .filter(|tx| tx.is_outflow())
            .map(|tx| tx.amount)
            .sum()
    }

    /// Pretty JSON dump handed to the aggregator
    pub fn to_prompt_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.transactions)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sample_ledger_is_complete() {
        let ledger = Ledger::sample();
        assert_eq!(ledger.len(), SAMPLE_ROWS.len());
        assert!(ledger.transactions().iter().all(|tx| tx.amount >= 0.0));
    }

    #[test]
    fn test_sample_ledger_is_date_ordered() {
        let dates: Vec<_> = Ledger::sample().transactions().iter().map(|tx| tx.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_this_week_spend_matches_fixtures() {
        let ledger = Ledger::sample();
        let window = PeriodWindow::this_week(date(2025, 7, 3));

        let expected: f64 = ledger
            .transactions()
            .iter()
            .filter(|tx| tx.direction == Direction::Outflow)
            .filter(|tx| tx.date >= date(2025, 6, 30) && tx.date <= date(2025, 7, 3))
            .map(|tx| tx.amount)
            .sum();

        assert_eq!(ledger.total_outflow(&window), expected);
        assert_eq!(expected, 30.0 + 15.0 + 10.0 + 5.0 + 20.0);
    }

    #[test]
    fn test_monday_window_only_counts_monday() {
        let ledger = Ledger::sample();
        let window = PeriodWindow::this_week(date(2025, 6, 30));
        assert_eq!(ledger.total_outflow(&window), 30.0);
    }

    #[test]
    fn test_inflow_excluded_from_spend() {
        let ledger = Ledger::sample();
        let window = PeriodWindow {
            start: date(2025, 7, 1),
            end: date(2025, 7, 1),
        };
        assert_eq!(ledger.total_outflow(&window), 15.0);
        assert_eq!(ledger.total_inflow(&window), 1200.0);
    }

    #[test]
    fn test_prompt_json_lists_every_transaction() {
        let json = Ledger::sample().to_prompt_json().unwrap();
        let parsed: Vec<Transaction> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), Ledger::sample().len());
        assert!(json.contains("\"2025-07-03\""));
        assert!(json.contains("\"Outflow\""));
    }

    #[test]
    fn test_all_time_outflow() {
        assert_eq!(Ledger::sample().all_time_outflow(), 145.0);
    }
}
