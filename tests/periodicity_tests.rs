mod common;

use chrono::{Datelike, Duration, NaiveDate};
use interreg_core::domain::{RecurrenceKind, RecurrenceSpec};
use interreg_core::periodicity::{
    calendar::days_in_month, generate_due_dates, plan_due_dates, MAX_DUE_DATES,
};
use proptest::prelude::*;

use common::date;

fn any_kind() -> impl Strategy<Value = RecurrenceKind> {
    prop::sample::select(RecurrenceKind::ALL.to_vec())
}

fn any_date() -> impl Strategy<Value = NaiveDate> {
    // 2020-01-01 plus up to ~10 years.
    (0i64..3650).prop_map(|offset| date(2020, 1, 1) + Duration::days(offset))
}

proptest! {
    #[test]
    fn output_is_bounded_sorted_and_inside_window(
        kind in any_kind(),
        interval in 1u32..6,
        frequency in 1u32..3,
        start in any_date(),
        span in 0i64..2000,
    ) {
        let spec = RecurrenceSpec::new(kind).with_interval(interval).with_frequency(frequency);
        let end = start + Duration::days(span);
        let dates = generate_due_dates(&spec, start, end);

        prop_assert!(dates.len() <= MAX_DUE_DATES);
        prop_assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
        if kind == RecurrenceKind::Once {
            prop_assert_eq!(dates, vec![start]);
        } else {
            prop_assert!(dates.iter().all(|d| *d >= start && *d <= end));
        }
    }

    #[test]
    fn generation_is_deterministic(
        kind in any_kind(),
        interval in 1u32..6,
        start in any_date(),
        span in 0i64..1500,
    ) {
        let spec = RecurrenceSpec::new(kind).with_interval(interval);
        let end = start + Duration::days(span);
        prop_assert_eq!(
            plan_due_dates(&spec, start, end),
            plan_due_dates(&spec, start, end)
        );
    }

    #[test]
    fn once_yields_start_for_any_end(start in any_date(), end in any_date()) {
        let dates = generate_due_dates(&RecurrenceSpec::new(RecurrenceKind::Once), start, end);
        prop_assert_eq!(dates, vec![start]);
    }

    #[test]
    fn twice_monthly_lands_on_first_and_fifteenth(
        interval in 1u32..4,
        start in any_date(),
        span in 0i64..1200,
    ) {
        let spec = RecurrenceSpec::new(RecurrenceKind::Monthly)
            .with_frequency(2)
            .with_interval(interval);
        let dates = generate_due_dates(&spec, start, start + Duration::days(span));
        prop_assert!(dates.iter().all(|d| d.day() == 1 || d.day() == 15));
        prop_assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn monthly_dates_clamp_without_drift(start in any_date(), interval in 1u32..4) {
        let spec = RecurrenceSpec::new(RecurrenceKind::Monthly).with_interval(interval);
        let dates = generate_due_dates(&spec, start, start + Duration::days(900));
        for d in &dates {
            let last = days_in_month(d.year(), d.month()).unwrap();
            prop_assert_eq!(d.day(), start.day().min(last));
        }
    }

    #[test]
    fn daily_count_matches_span_until_cap(span in 0i64..300) {
        let start = date(2025, 1, 1);
        let plan = plan_due_dates(
            &RecurrenceSpec::new(RecurrenceKind::Daily),
            start,
            start + Duration::days(span),
        );
        let expected = usize::try_from(span + 1).unwrap();
        prop_assert_eq!(plan.dates.len(), expected.min(MAX_DUE_DATES));
        prop_assert_eq!(plan.truncated, expected > MAX_DUE_DATES);
    }
}

#[test]
fn four_monthly_reporting_cycle() {
    let spec = RecurrenceSpec::new(RecurrenceKind::Monthly).with_interval(4);
    assert_eq!(
        generate_due_dates(&spec, date(2025, 1, 1), date(2026, 12, 31)),
        vec![
            date(2025, 1, 1),
            date(2025, 5, 1),
            date(2025, 9, 1),
            date(2026, 1, 1),
            date(2026, 5, 1),
            date(2026, 9, 1),
        ]
    );
}

#[test]
fn twice_monthly_skips_dates_before_start() {
    let spec = RecurrenceSpec::new(RecurrenceKind::Monthly).with_frequency(2);
    assert_eq!(
        generate_due_dates(&spec, date(2025, 1, 10), date(2025, 3, 1)),
        vec![date(2025, 1, 15), date(2025, 2, 1), date(2025, 2, 15), date(2025, 3, 1)]
    );
}

#[test]
fn quarterly_semi_annual_and_annual_steps() {
    let start = date(2024, 2, 29);
    let end = date(2026, 12, 31);
    assert_eq!(
        generate_due_dates(&RecurrenceSpec::new(RecurrenceKind::SemiAnnually), start, end),
        vec![
            date(2024, 2, 29),
            date(2024, 8, 29),
            date(2025, 2, 28),
            date(2025, 8, 29),
            date(2026, 2, 28),
            date(2026, 8, 29),
        ]
    );
    assert_eq!(
        generate_due_dates(&RecurrenceSpec::new(RecurrenceKind::Annually), start, end),
        vec![date(2024, 2, 29), date(2025, 2, 28), date(2026, 2, 28)]
    );
    assert_eq!(
        generate_due_dates(&RecurrenceSpec::new(RecurrenceKind::Quarterly), start, end).len(),
        12
    );
}

#[test]
fn unrecognized_kind_falls_back_to_monthly() {
    let spec: RecurrenceSpec =
        serde_json::from_str(r#"{"kind":"FORTNIGHTLY","interval":5}"#).unwrap();
    assert_eq!(spec.kind, RecurrenceKind::Custom);
    assert_eq!(
        generate_due_dates(&spec, date(2025, 1, 1), date(2025, 3, 31)),
        vec![date(2025, 1, 1), date(2025, 2, 1), date(2025, 3, 1)]
    );
}
