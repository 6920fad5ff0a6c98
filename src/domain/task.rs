use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Displayable, Identifiable, NamedEntity, DISPLAY_DATE_FORMAT};
use crate::domain::recurrence::RecurrenceSpec;
use crate::periodicity::DateWindow;

/// A recurring obligation such as a reporting deadline or monitoring visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParentTask {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub recurrence: Option<RecurrenceSpec>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ParentTask {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            start_date: None,
            end_date: None,
            recurrence: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_recurrence(mut self, spec: RecurrenceSpec) -> Self {
        self.recurrence = Some(spec);
        self
    }

    /// Generation window, falling back to the program window for missing bounds.
    pub fn window(&self, program: DateWindow) -> DateWindow {
        DateWindow::new(
            self.start_date.unwrap_or(program.start),
            self.end_date.unwrap_or(program.end),
        )
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Identifiable for ParentTask {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for ParentTask {
    fn name(&self) -> &str {
        &self.title
    }
}

impl Displayable for ParentTask {
    fn display_label(&self) -> String {
        match &self.recurrence {
            Some(spec) => format!("{} ({})", self.title, spec.label()),
            None => format!("{} (no recurrence)", self.title),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubTaskStatus {
    Pending,
    Completed,
}

/// One concrete due occurrence of a parent task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubTask {
    pub id: Uuid,
    pub parent_task_id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub status: SubTaskStatus,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl SubTask {
    /// Builds the subtask for `due_date`, deriving title and description from the parent.
    pub fn for_occurrence(parent: &ParentTask, due_date: NaiveDate) -> Self {
        let formatted = due_date.format(DISPLAY_DATE_FORMAT);
        let cadence = parent
            .recurrence
            .as_ref()
            .map(|spec| spec.label())
            .unwrap_or_else(|| "One-off".into());
        Self {
            id: Uuid::new_v4(),
            parent_task_id: parent.id,
            title: format!("{} - {}", parent.title, formatted),
            description: format!("{cadence} occurrence of \"{}\" due {formatted}", parent.title),
            due_date,
            status: SubTaskStatus::Pending,
            completed_at: None,
        }
    }

    /// Applies a status change. Returns whether anything changed.
    pub fn set_status(&mut self, status: SubTaskStatus, at: DateTime<Utc>) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        self.completed_at = match status {
            SubTaskStatus::Completed => Some(at),
            SubTaskStatus::Pending => None,
        };
        true
    }
}

impl Identifiable for SubTask {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for SubTask {
    fn name(&self) -> &str {
        &self.title
    }
}
