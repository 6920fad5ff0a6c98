mod common;

use interreg_core::core::NewTask;
use interreg_core::domain::{RecurrenceKind, RecurrenceSpec, SubTask, SubTaskStatus};
use interreg_core::errors::CoreError;
use interreg_core::periodicity::MAX_DUE_DATES;
use interreg_core::storage::TaskRepository;

use common::{date, memory_services};

#[test]
fn generated_subtasks_follow_schedule_and_naming() {
    let (_store, services) = memory_services();
    let task = services
        .tasks
        .create_task(NewTask {
            title: "Progress report".into(),
            start_date: Some(date(2025, 1, 1)),
            end_date: Some(date(2026, 12, 31)),
            recurrence: Some(RecurrenceSpec::new(RecurrenceKind::Monthly).with_interval(4)),
        })
        .unwrap();

    let report = services.tasks.regenerate_subtasks(task.id).unwrap();
    assert_eq!(report.count(), 6);
    assert!(!report.truncated);
    assert!(report.failed.is_empty());

    let subtasks = services.tasks.subtasks(task.id).unwrap();
    let titles: Vec<&str> = subtasks.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        [
            "Progress report - 01/01/2025",
            "Progress report - 01/05/2025",
            "Progress report - 01/09/2025",
            "Progress report - 01/01/2026",
            "Progress report - 01/05/2026",
            "Progress report - 01/09/2026",
        ]
    );
    assert!(subtasks
        .iter()
        .all(|s| s.status == SubTaskStatus::Pending && s.completed_at.is_none()));
}

#[test]
fn regenerating_twice_keeps_only_second_run() {
    let (store, services) = memory_services();
    let task = services
        .tasks
        .create_task(NewTask {
            title: "Partner call".into(),
            start_date: Some(date(2025, 3, 1)),
            end_date: Some(date(2025, 3, 31)),
            recurrence: Some(RecurrenceSpec::new(RecurrenceKind::Weekly)),
        })
        .unwrap();

    let first = services.tasks.regenerate_subtasks(task.id).unwrap();
    services
        .tasks
        .set_subtask_status(first.subtasks[0].id, SubTaskStatus::Completed)
        .unwrap();
    let second = services.tasks.regenerate_subtasks(task.id).unwrap();

    assert_eq!(first.count(), 5);
    assert_eq!(second.removed, 5);
    assert_eq!(store.subtasks(task.id).unwrap().len(), second.count());
    // Manual edits do not survive.
    assert!(store
        .subtasks(task.id)
        .unwrap()
        .iter()
        .all(|s| s.status == SubTaskStatus::Pending));
}

#[test]
fn tasks_without_dates_use_program_window() {
    let (_store, services) = memory_services();
    let task = services
        .tasks
        .create_task(NewTask {
            title: "Annual review".into(),
            recurrence: Some(RecurrenceSpec::new(RecurrenceKind::Annually)),
            ..NewTask::default()
        })
        .unwrap();
    let report = services.tasks.regenerate_subtasks(task.id).unwrap();
    let dates: Vec<_> = report.subtasks.iter().map(|s| s.due_date).collect();
    assert_eq!(
        dates,
        [date(2024, 1, 1), date(2025, 1, 1), date(2026, 1, 1), date(2027, 1, 1)]
    );
}

#[test]
fn capped_schedule_is_reported_as_truncated() {
    let (_store, services) = memory_services();
    let task = services
        .tasks
        .create_task(NewTask {
            title: "Daily log".into(),
            start_date: Some(date(2025, 1, 1)),
            end_date: Some(date(2025, 12, 31)),
            recurrence: Some(RecurrenceSpec::new(RecurrenceKind::Daily)),
        })
        .unwrap();
    let report = services.tasks.regenerate_subtasks(task.id).unwrap();
    assert!(report.truncated);
    assert_eq!(report.count(), MAX_DUE_DATES);
    assert_eq!(report.subtasks.last().unwrap().due_date, date(2025, 4, 10));
}

#[test]
fn regeneration_needs_task_and_recurrence() {
    let (_store, services) = memory_services();
    let err = services
        .tasks
        .regenerate_subtasks(uuid::Uuid::new_v4())
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { entity: "Task", .. }));

    let plain = services
        .tasks
        .create_task(NewTask {
            title: "Kick-off".into(),
            ..NewTask::default()
        })
        .unwrap();
    let err = services.tasks.regenerate_subtasks(plain.id).unwrap_err();
    assert!(matches!(err, CoreError::NotFound { entity: "RecurrenceSpec", .. }));
}

#[test]
fn zero_interval_is_rejected_before_generation() {
    let (_store, services) = memory_services();
    let err = services
        .tasks
        .create_task(NewTask {
            title: "Broken".into(),
            recurrence: Some(RecurrenceSpec::new(RecurrenceKind::Weekly).with_interval(0)),
            ..NewTask::default()
        })
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[test]
fn occurrence_description_names_cadence() {
    let (_store, services) = memory_services();
    let task = services
        .tasks
        .create_task(NewTask {
            title: "Newsletter".into(),
            start_date: Some(date(2025, 1, 1)),
            end_date: Some(date(2025, 1, 31)),
            recurrence: Some(RecurrenceSpec::new(RecurrenceKind::Monthly).with_frequency(2)),
        })
        .unwrap();
    let report = services.tasks.regenerate_subtasks(task.id).unwrap();
    let first: &SubTask = &report.subtasks[0];
    assert_eq!(report.count(), 2);
    assert!(first.description.contains("Newsletter"));
    assert!(first.description.contains("01/01/2025"));
}
