//! Recurring tasks and the subtasks generated from them.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{ParentTask, RecurrenceSpec, SubTask, SubTaskStatus};
use crate::errors::{CoreError, Result};
use crate::periodicity::{plan_due_dates, DateWindow};
use crate::storage::{InsertFailure, TaskRepository};

/// Input for [`TaskService::create_task`].
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub recurrence: Option<RecurrenceSpec>,
}

/// Result of a full subtask regeneration for one parent task.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerationReport {
    pub parent_task_id: Uuid,
    pub window: DateWindow,
    pub removed: usize,
    pub subtasks: Vec<SubTask>,
    pub failed: Vec<InsertFailure>,
    /// The due-date safety cap cut the schedule short.
    pub truncated: bool,
}

impl RegenerationReport {
    pub fn count(&self) -> usize {
        self.subtasks.len()
    }
}

pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    program_window: DateWindow,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepository>, program_window: DateWindow) -> Self {
        Self {
            tasks,
            program_window,
        }
    }

    pub fn program_window(&self) -> DateWindow {
        self.program_window
    }

    pub fn create_task(&self, input: NewTask) -> Result<ParentTask> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(CoreError::Validation("task title must not be empty".into()));
        }
        if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
            DateWindow::checked(start, end)?;
        }
        if let Some(spec) = &input.recurrence {
            spec.validate()?;
        }
        let mut task = ParentTask::new(title).with_dates(input.start_date, input.end_date);
        task.recurrence = input.recurrence;
        let task = self.tasks.insert_task(task)?;
        tracing::info!(task_id = %task.id, title = %task.title, "created task");
        Ok(task)
    }

    pub fn task(&self, id: Uuid) -> Result<ParentTask> {
        self.tasks
            .task(id)?
            .ok_or_else(|| CoreError::not_found("Task", id))
    }

    pub fn tasks(&self) -> Result<Vec<ParentTask>> {
        self.tasks.tasks()
    }

    /// Replaces the task's recurrence and regenerates its subtasks, since
    /// dates produced under the old spec are no longer valid.
    pub fn set_recurrence(&self, id: Uuid, spec: RecurrenceSpec) -> Result<RegenerationReport> {
        spec.validate()?;
        let mut task = self.task(id)?;
        task.recurrence = Some(spec);
        task.touch();
        self.tasks.update_task(task)?;
        self.regenerate_subtasks(id)
    }

    /// Deletes every subtask of the task and inserts one per generated due date.
    ///
    /// Manual edits to the previous subtasks are discarded.
    pub fn regenerate_subtasks(&self, parent_task_id: Uuid) -> Result<RegenerationReport> {
        let task = self.task(parent_task_id)?;
        let spec = task
            .recurrence
            .as_ref()
            .ok_or_else(|| CoreError::not_found("RecurrenceSpec", parent_task_id))?;
        spec.validate()?;

        let window = task.window(self.program_window);
        let plan = plan_due_dates(spec, window.start, window.end);
        if plan.truncated {
            tracing::warn!(
                task_id = %task.id,
                kind = %spec.kind,
                interval = spec.interval,
                "due-date generation hit the safety cap; schedule truncated"
            );
        }

        let batch = plan
            .dates
            .iter()
            .map(|due| SubTask::for_occurrence(&task, *due))
            .collect();
        let outcome = self.tasks.replace_subtasks(task.id, batch)?;
        for failure in &outcome.failed {
            tracing::warn!(
                task_id = %task.id,
                due_date = %failure.due_date,
                reason = %failure.reason,
                "failed to insert subtask"
            );
        }
        tracing::info!(
            task_id = %task.id,
            removed = outcome.removed,
            inserted = outcome.inserted.len(),
            failed = outcome.failed.len(),
            "regenerated subtasks"
        );

        Ok(RegenerationReport {
            parent_task_id: task.id,
            window,
            removed: outcome.removed,
            subtasks: outcome.inserted,
            failed: outcome.failed,
            truncated: plan.truncated,
        })
    }

    pub fn subtasks(&self, parent_task_id: Uuid) -> Result<Vec<SubTask>> {
        self.task(parent_task_id)?;
        self.tasks.subtasks(parent_task_id)
    }

    pub fn set_subtask_status(&self, subtask_id: Uuid, status: SubTaskStatus) -> Result<SubTask> {
        let mut subtask = self
            .tasks
            .subtask(subtask_id)?
            .ok_or_else(|| CoreError::not_found("SubTask", subtask_id))?;
        if !subtask.set_status(status, Utc::now()) {
            return Ok(subtask);
        }
        self.tasks.update_subtask(subtask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecurrenceKind;
    use crate::storage::MemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service() -> TaskService {
        TaskService::new(Arc::new(MemoryStore::new()), DateWindow::default())
    }

    #[test]
    fn regenerate_without_recurrence_is_not_found() {
        let service = service();
        let task = service
            .create_task(NewTask {
                title: "Kick-off".into(),
                ..NewTask::default()
            })
            .unwrap();
        let err = service.regenerate_subtasks(task.id).unwrap_err();
        assert!(matches!(
            err,
            CoreError::NotFound {
                entity: "RecurrenceSpec",
                ..
            }
        ));
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = service()
            .create_task(NewTask {
                title: "  ".into(),
                ..NewTask::default()
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn set_recurrence_replaces_schedule() {
        let service = service();
        let task = service
            .create_task(NewTask {
                title: "Financial report".into(),
                start_date: Some(date(2025, 1, 1)),
                end_date: Some(date(2025, 12, 31)),
                recurrence: Some(RecurrenceSpec::new(RecurrenceKind::Monthly)),
            })
            .unwrap();
        assert_eq!(service.regenerate_subtasks(task.id).unwrap().count(), 12);

        let report = service
            .set_recurrence(task.id, RecurrenceSpec::new(RecurrenceKind::Quarterly))
            .unwrap();
        assert_eq!(report.removed, 12);
        assert_eq!(report.count(), 4);
        assert_eq!(service.subtasks(task.id).unwrap().len(), 4);
    }

    #[test]
    fn completing_and_reopening_subtask_tracks_timestamp() {
        let service = service();
        let task = service
            .create_task(NewTask {
                title: "Site visit".into(),
                start_date: Some(date(2025, 3, 1)),
                end_date: Some(date(2025, 3, 1)),
                recurrence: Some(RecurrenceSpec::new(RecurrenceKind::Once)),
            })
            .unwrap();
        let report = service.regenerate_subtasks(task.id).unwrap();
        let subtask_id = report.subtasks[0].id;

        let done = service
            .set_subtask_status(subtask_id, SubTaskStatus::Completed)
            .unwrap();
        assert!(done.completed_at.is_some());

        let reopened = service
            .set_subtask_status(subtask_id, SubTaskStatus::Pending)
            .unwrap();
        assert!(reopened.completed_at.is_none());
    }
}
