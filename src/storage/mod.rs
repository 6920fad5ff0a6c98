//! Persistence interfaces consumed by the task and expense services.
//!
//! Services receive these as `Arc<dyn ...>` handles built once at start-up.
//! [`MemoryStore`] backs tests and the HTTP server; [`JsonStore`] adds a
//! durable snapshot on disk.

pub mod json_backend;
pub mod memory;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    BudgetItem, Expense, ExpenseApproval, ExpenseStatus, ParentTask, SubTask, User,
};
use crate::errors::Result;

pub use json_backend::JsonStore;
pub use memory::MemoryStore;

/// Bumped whenever [`StoreData`] changes shape.
pub const STORE_SCHEMA_VERSION: u32 = 1;

/// Outcome of replacing a parent task's subtasks.
#[derive(Debug, Clone, Default)]
pub struct ReplaceOutcome {
    pub removed: usize,
    pub inserted: Vec<SubTask>,
    pub failed: Vec<InsertFailure>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertFailure {
    pub due_date: chrono::NaiveDate,
    pub reason: String,
}

pub trait TaskRepository: Send + Sync {
    fn insert_task(&self, task: ParentTask) -> Result<ParentTask>;
    fn task(&self, id: Uuid) -> Result<Option<ParentTask>>;
    fn tasks(&self) -> Result<Vec<ParentTask>>;
    /// Overwrites an existing task; `NotFound` when it does not exist.
    fn update_task(&self, task: ParentTask) -> Result<ParentTask>;

    /// Subtasks of `parent_id`, ordered by due date.
    fn subtasks(&self, parent_id: Uuid) -> Result<Vec<SubTask>>;
    fn subtask(&self, id: Uuid) -> Result<Option<SubTask>>;
    fn update_subtask(&self, subtask: SubTask) -> Result<SubTask>;
    fn delete_subtasks(&self, parent_id: Uuid) -> Result<usize>;
    fn insert_subtask(&self, subtask: SubTask) -> Result<SubTask>;

    /// Deletes every subtask of `parent_id`, then inserts `subtasks` one by one.
    ///
    /// A failing insert is recorded and skipped; the rest of the batch still
    /// goes in. Backends with a transaction boundary should override this so
    /// readers never observe the intermediate empty set.
    fn replace_subtasks(&self, parent_id: Uuid, subtasks: Vec<SubTask>) -> Result<ReplaceOutcome> {
        let mut outcome = ReplaceOutcome {
            removed: self.delete_subtasks(parent_id)?,
            ..ReplaceOutcome::default()
        };
        for subtask in subtasks {
            let due_date = subtask.due_date;
            match self.insert_subtask(subtask) {
                Ok(stored) => outcome.inserted.push(stored),
                Err(err) => outcome.failed.push(InsertFailure {
                    due_date,
                    reason: err.to_string(),
                }),
            }
        }
        Ok(outcome)
    }
}

/// Conditional append of an approval: applied only while the expense still
/// has `expected_status` and exactly `expected_approvals` recorded decisions.
#[derive(Debug, Clone)]
pub struct ApprovalWrite {
    pub approval: ExpenseApproval,
    pub expected_status: ExpenseStatus,
    pub expected_approvals: usize,
    pub next_status: ExpenseStatus,
}

#[derive(Debug, Clone)]
pub enum AppendOutcome {
    /// The approval is recorded. `budget_item` already includes any spend the
    /// write booked.
    Applied {
        expense: Expense,
        budget_item: BudgetItem,
    },
    /// Another writer got there first; carries the current state for a retry.
    Stale(Expense),
}

impl ApprovalWrite {
    /// The write moves the expense into `APPROVED` and so books its amount.
    pub fn books_spend(&self) -> bool {
        self.expected_status != ExpenseStatus::Approved
            && self.next_status == ExpenseStatus::Approved
    }
}

pub trait BudgetRepository: Send + Sync {
    fn insert_budget_item(&self, item: BudgetItem) -> Result<BudgetItem>;
    fn budget_item(&self, id: Uuid) -> Result<Option<BudgetItem>>;
    fn budget_items(&self) -> Result<Vec<BudgetItem>>;
    /// Atomically adds `amount` to the item's spent amount.
    fn increment_spent(&self, id: Uuid, amount: Decimal) -> Result<BudgetItem>;

    fn insert_expense(&self, expense: Expense) -> Result<Expense>;
    fn expense(&self, id: Uuid) -> Result<Option<Expense>>;
    fn expenses_for_item(&self, budget_item_id: Uuid) -> Result<Vec<Expense>>;
    /// Appends an approval under optimistic concurrency. A second decision by
    /// the same approver is a `Conflict`.
    ///
    /// When the write moves the expense into `APPROVED`, the expense amount
    /// is added to the budget item's spent amount in the same operation;
    /// either both changes land or neither does.
    fn append_approval(&self, expense_id: Uuid, write: ApprovalWrite) -> Result<AppendOutcome>;
}

pub trait UserRepository: Send + Sync {
    fn insert_user(&self, user: User) -> Result<User>;
    fn user(&self, id: Uuid) -> Result<Option<User>>;
    fn users(&self) -> Result<Vec<User>>;
}

/// Serializable image of every collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreData {
    pub schema_version: u32,
    #[serde(default)]
    pub tasks: Vec<ParentTask>,
    #[serde(default)]
    pub subtasks: Vec<SubTask>,
    #[serde(default)]
    pub budget_items: Vec<BudgetItem>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub users: Vec<User>,
}
