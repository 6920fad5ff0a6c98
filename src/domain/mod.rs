//! Domain models for recurring tasks and budget spending.

pub mod budget;
pub mod common;
pub mod expense;
pub mod recurrence;
pub mod task;
pub mod user;

pub use budget::BudgetItem;
pub use common::{Displayable, Identifiable, NamedEntity};
pub use expense::{ApprovalDecision, Expense, ExpenseApproval, ExpenseStatus};
pub use recurrence::{RecurrenceKind, RecurrenceSpec};
pub use task::{ParentTask, SubTask, SubTaskStatus};
pub use user::User;
