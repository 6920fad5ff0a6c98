use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

/// Inclusive date range used as a generation window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Like [`DateWindow::new`] but rejects inverted ranges.
    pub fn checked(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(CoreError::Validation(format!(
                "window end {end} is before start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }
}

impl Default for DateWindow {
    /// The programme period used when a task carries no explicit dates.
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(2027, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }
}
