use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Date format used for the provider's time period strings.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The range of whole calendar months covered by a report. `end` is exclusive.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ReportWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl ReportWindow {
    /// Computes the window that ends at the start of `today`'s month and begins at the start of
    /// the month that `today - days` falls in.
    pub fn trailing(today: NaiveDate, days: u32) -> Self {
        let end = first_of_month(today);
        let back = today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        let start = first_of_month(back).min(end);
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// True when the window covers no days at all. The provider rejects such ranges so callers
    /// should not query it.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn start_str(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

impl Display for ReportWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "from {} to {}", self.start_str(), self.end_str())
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month.
    date.with_day(1).unwrap_or(date)
}
