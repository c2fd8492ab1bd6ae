//! Period resolution
//!
//! Only "this week" has a hard-coded meaning: from the most recent Monday
//! on or before the reference date through the reference date, inclusive.
//! Every other period is interpreted by the language model, best-effort.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wording of the weekly rule as it is handed to the aggregator
pub const THIS_WEEK_RULE: &str =
    "\"this week\" means the interval from the most recent Monday on or before today through today, inclusive";

const THIS_WEEK_ALIASES: &[&str] = &["this week", "current week", "questa settimana"];

/// Inclusive date interval
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeriodWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodWindow {
    pub fn this_week(reference: NaiveDate) -> Self {
        let back = reference.weekday().num_days_from_monday() as i64;
        Self {
            start: reference - Duration::days(back),
            end: reference,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for PeriodWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Resolve a period description that has a deterministic meaning.
///
/// Returns `None` for anything the model has to interpret on its own.
pub fn resolve_known_period(text: &str, reference: NaiveDate) -> Option<PeriodWindow> {
    let normalized = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if THIS_WEEK_ALIASES.iter().any(|alias| normalized == *alias) {
        Some(PeriodWindow::this_week(reference))
    } else {
        None
    }
}

pub fn format_reference_date(reference: NaiveDate) -> String {
    reference.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_this_week_from_thursday() {
        let window = PeriodWindow::this_week(date(2025, 7, 3));
        assert_eq!(window.start, date(2025, 6, 30));
        assert_eq!(window.end, date(2025, 7, 3));
        assert_eq!(window.days(), 4);
    }

    #[test]
    fn test_this_week_on_monday_is_single_day() {
        let monday = date(2025, 6, 30);
        let window = PeriodWindow::this_week(monday);
        assert_eq!(window.start, monday);
        assert_eq!(window.end, monday);
        assert_eq!(window.days(), 1);
    }

    #[test]
    fn test_this_week_on_sunday_spans_seven_days() {
        let window = PeriodWindow::this_week(date(2025, 7, 6));
        assert_eq!(window.start, date(2025, 6, 30));
        assert_eq!(window.days(), 7);
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let window = PeriodWindow::this_week(date(2025, 7, 3));
        assert!(window.contains(date(2025, 6, 30)));
        assert!(window.contains(date(2025, 7, 3)));
        assert!(!window.contains(date(2025, 6, 29)));
        assert!(!window.contains(date(2025, 7, 4)));
    }

    #[test]
    fn test_resolve_known_period_aliases() {
        let reference = date(2025, 7, 3);
        let expected = Some(PeriodWindow::this_week(reference));

        assert_eq!(resolve_known_period("this week", reference), expected);
        assert_eq!(resolve_known_period("  This   WEEK ", reference), expected);
        assert_eq!(resolve_known_period("questa settimana", reference), expected);
        assert_eq!(resolve_known_period("last month", reference), None);
        assert_eq!(resolve_known_period("yesterday", reference), None);
    }

    #[test]
    fn test_reference_date_format() {
        assert_eq!(format_reference_date(date(2025, 7, 3)), "2025-07-03");
        assert_eq!(PeriodWindow::this_week(date(2025, 7, 3)).to_string(), "2025-06-30 to 2025-07-03");
    }
}
