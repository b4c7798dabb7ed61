//! Date windows used to match transactions against budgets

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive `[start, end]` date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Create a window; callers guarantee `start <= end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Window of a budget, if both bounds are set
    pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Some(Self::new(start, end)),
            _ => None,
        }
    }

    /// Check if a date falls inside the window, bounds included
    pub fn contains(&self, date: &NaiveDate) -> bool {
        *date >= self.start && *date <= self.end
    }

    /// The `days` days immediately before `start`, excluding `start` itself
    pub fn preceding(&self, days: u32) -> Self {
        Self {
            start: self.start - Duration::days(days as i64),
            end: self.start - Duration::days(1),
        }
    }

    /// Number of calendar days covered
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Get a human-readable description of the window
    pub fn description(&self) -> String {
        format!("{} to {}", self.start, self.end)
    }
}

/// Instant `days` days before `now`, clamped to the earliest representable instant
pub fn days_before(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Something that carries a date and can be checked against a window
pub trait Dated {
    fn on_date(&self) -> NaiveDate;

    fn within(&self, window: &DateWindow) -> bool {
        window.contains(&self.on_date())
    }
}

impl Dated for crate::models::Transaction {
    fn on_date(&self) -> NaiveDate {
        self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_contains_bounds() {
        let window = DateWindow::new(date(2024, 1, 1), date(2024, 1, 31));

        assert!(window.contains(&date(2024, 1, 1)));
        assert!(window.contains(&date(2024, 1, 15)));
        assert!(window.contains(&date(2024, 1, 31)));
        assert!(!window.contains(&date(2023, 12, 31)));
        assert!(!window.contains(&date(2024, 2, 1)));
        assert_eq!(window.len_days(), 31);
    }

    #[test]
    fn test_from_bounds_requires_both_dates() {
        assert!(DateWindow::from_bounds(Some(date(2024, 1, 1)), None).is_none());
        assert!(DateWindow::from_bounds(None, Some(date(2024, 1, 31))).is_none());
        assert_eq!(
            DateWindow::from_bounds(Some(date(2024, 1, 1)), Some(date(2024, 1, 31))),
            Some(DateWindow::new(date(2024, 1, 1), date(2024, 1, 31)))
        );
    }

    #[test]
    fn test_preceding_window_excludes_start() {
        let window = DateWindow::new(date(2024, 3, 1), date(2024, 3, 31));
        let previous = window.preceding(30);

        assert_eq!(previous.start, date(2024, 1, 31));
        assert_eq!(previous.end, date(2024, 2, 29));
        assert_eq!(previous.len_days(), 30);
        assert!(!previous.contains(&window.start));
    }

    #[test]
    fn test_description() {
        let window = DateWindow::new(date(2024, 1, 1), date(2024, 12, 31));
        assert_eq!(window.description(), "2024-01-01 to 2024-12-31");
    }

    #[test]
    fn test_days_before() {
        let now = date(2024, 6, 30).and_hms_opt(12, 0, 0).unwrap().and_utc();
        let cutoff = days_before(now, 30);
        assert_eq!(cutoff.date_naive(), date(2024, 5, 31));
    }

    #[test]
    fn test_days_before_clamps_on_overflow() {
        let now = date(2024, 6, 30).and_hms_opt(12, 0, 0).unwrap().and_utc();
        assert_eq!(days_before(now, u32::MAX), DateTime::<Utc>::MIN_UTC);
    }
}
