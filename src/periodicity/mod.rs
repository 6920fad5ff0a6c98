//! Due-date generation for recurring obligations.
//!
//! [`plan_due_dates`] is the single source of truth for turning a
//! [`RecurrenceSpec`] and a window into concrete dates. It is pure: the same
//! inputs always produce the same ascending, duplicate-free list.
//!
//! Every occurrence is computed from the window start (`start + k * step`)
//! rather than from the previous occurrence, so month-end clamping never
//! drifts: a Jan 31 start yields Feb 28, Mar 31, Apr 30, ...

pub mod calendar;
pub mod window;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::recurrence::{RecurrenceKind, RecurrenceSpec};

pub use window::DateWindow;

/// Upper bound on dates emitted by a single generation call.
pub const MAX_DUE_DATES: usize = 100;

/// Days of the month used by the twice-monthly cadence.
const TWICE_MONTHLY_DAYS: [u32; 2] = [1, 15];

/// Generated dates plus whether the safety cap cut the sequence short.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DueDatePlan {
    pub dates: Vec<NaiveDate>,
    pub truncated: bool,
}

impl DueDatePlan {
    fn push(&mut self, date: NaiveDate) -> bool {
        if self.dates.len() >= MAX_DUE_DATES {
            self.truncated = true;
            return false;
        }
        self.dates.push(date);
        true
    }
}

#[derive(Debug, Clone, Copy)]
enum Cadence {
    Days(u64),
    Months(i64),
    Years(i64),
    TwiceMonthly { interval: i64 },
}

impl Cadence {
    fn for_spec(spec: &RecurrenceSpec) -> Option<Self> {
        let interval = spec.interval.max(1);
        let cadence = match spec.kind {
            RecurrenceKind::Once => return None,
            RecurrenceKind::Daily => Cadence::Days(u64::from(interval)),
            RecurrenceKind::Weekly => Cadence::Days(7 * u64::from(interval)),
            RecurrenceKind::Monthly if spec.frequency == 2 => Cadence::TwiceMonthly {
                interval: i64::from(interval),
            },
            // Every-4-months reporting cycle; equal to the general rule below.
            RecurrenceKind::Monthly if interval == 4 => Cadence::Months(4),
            RecurrenceKind::Monthly => Cadence::Months(i64::from(interval)),
            RecurrenceKind::Quarterly => Cadence::Months(3 * i64::from(interval)),
            RecurrenceKind::SemiAnnually => Cadence::Months(6 * i64::from(interval)),
            RecurrenceKind::Annually => Cadence::Years(i64::from(interval)),
            RecurrenceKind::Custom => Cadence::Months(1),
        };
        Some(cadence)
    }

    /// The `step`-th occurrence counted from `anchor`.
    fn nth(self, anchor: NaiveDate, step: i64) -> Option<NaiveDate> {
        match self {
            Cadence::Days(days) => {
                calendar::shift_days(anchor, days.checked_mul(u64::try_from(step).ok()?)?)
            }
            Cadence::Months(months) | Cadence::TwiceMonthly { interval: months } => {
                calendar::shift_month(anchor, months.checked_mul(step)?)
            }
            Cadence::Years(years) => calendar::shift_year(anchor, years.checked_mul(step)?),
        }
    }
}

/// Returns the due dates for `spec` inside `[window_start, window_end]`.
pub fn generate_due_dates(
    spec: &RecurrenceSpec,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Vec<NaiveDate> {
    plan_due_dates(spec, window_start, window_end).dates
}

/// Like [`generate_due_dates`] but also reports truncation by the safety cap.
///
/// `ONCE` always yields `[window_start]`, even for an inverted window. Every
/// other kind yields nothing when `window_end < window_start`.
pub fn plan_due_dates(
    spec: &RecurrenceSpec,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> DueDatePlan {
    let mut plan = DueDatePlan::default();
    let Some(cadence) = Cadence::for_spec(spec) else {
        plan.push(window_start);
        return plan;
    };
    if window_end < window_start {
        return plan;
    }

    match cadence {
        Cadence::TwiceMonthly { .. } => {
            twice_monthly(cadence, window_start, window_end, &mut plan)
        }
        _ => stepped(cadence, window_start, window_end, &mut plan),
    }
    plan
}

fn stepped(cadence: Cadence, start: NaiveDate, end: NaiveDate, plan: &mut DueDatePlan) {
    let mut step = 0i64;
    while step <= MAX_DUE_DATES as i64 {
        let Some(date) = cadence.nth(start, step) else {
            return;
        };
        if date > end || !plan.push(date) {
            return;
        }
        step += 1;
    }
}

fn twice_monthly(cadence: Cadence, start: NaiveDate, end: NaiveDate, plan: &mut DueDatePlan) {
    let anchor = calendar::first_of_month(start);
    let mut step = 0i64;
    while step <= MAX_DUE_DATES as i64 {
        let Some(month) = cadence.nth(anchor, step) else {
            return;
        };
        if month > end {
            return;
        }
        for day in TWICE_MONTHLY_DAYS {
            let Some(date) = month.with_day(day) else {
                continue;
            };
            if date < start {
                continue;
            }
            if date > end || !plan.push(date) {
                return;
            }
        }
        step += 1;
    }
}
