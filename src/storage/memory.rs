use std::collections::HashMap;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{
    AppendOutcome, ApprovalWrite, BudgetRepository, InsertFailure, ReplaceOutcome, StoreData,
    TaskRepository, UserRepository, STORE_SCHEMA_VERSION,
};
use crate::domain::{BudgetItem, Expense, ParentTask, SubTask, User};
use crate::errors::{CoreError, Result};

#[derive(Debug, Default)]
struct Tables {
    tasks: HashMap<Uuid, ParentTask>,
    subtasks: HashMap<Uuid, SubTask>,
    budget_items: HashMap<Uuid, BudgetItem>,
    expenses: HashMap<Uuid, Expense>,
    users: HashMap<Uuid, User>,
}

impl Tables {
    fn insert_subtask(&mut self, subtask: SubTask) -> Result<SubTask> {
        if !self.tasks.contains_key(&subtask.parent_task_id) {
            return Err(CoreError::not_found("Task", subtask.parent_task_id));
        }
        if self.subtasks.contains_key(&subtask.id) {
            return Err(CoreError::Conflict(format!(
                "subtask {} already exists",
                subtask.id
            )));
        }
        self.subtasks.insert(subtask.id, subtask.clone());
        Ok(subtask)
    }

    fn increment_spent(&mut self, id: Uuid, amount: Decimal) -> Result<BudgetItem> {
        let item = self
            .budget_items
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found("BudgetItem", id))?;
        item.spent_amount += amount;
        Ok(item.clone())
    }

    fn delete_subtasks(&mut self, parent_id: Uuid) -> usize {
        let before = self.subtasks.len();
        self.subtasks
            .retain(|_, subtask| subtask.parent_task_id != parent_id);
        before - self.subtasks.len()
    }
}

fn sorted_by<T, K: Ord>(values: impl Iterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut list: Vec<T> = values.collect();
    list.sort_by_key(|value| key(value));
    list
}

/// Process-local store guarded by a single reader/writer lock.
///
/// Every trait method holds the lock for its whole body, so increments,
/// conditional appends and subtask replacement are atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: StoreData) -> Self {
        let tables = Tables {
            tasks: data.tasks.into_iter().map(|t| (t.id, t)).collect(),
            subtasks: data.subtasks.into_iter().map(|s| (s.id, s)).collect(),
            budget_items: data.budget_items.into_iter().map(|b| (b.id, b)).collect(),
            expenses: data.expenses.into_iter().map(|e| (e.id, e)).collect(),
            users: data.users.into_iter().map(|u| (u.id, u)).collect(),
        };
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Swaps in every collection of `staged` at once.
    pub(crate) fn install(&self, staged: MemoryStore) {
        *self.tables.write() = staged.tables.into_inner();
    }

    /// Consistent copy of every collection, ordered for stable output.
    pub fn snapshot(&self) -> StoreData {
        let tables = self.tables.read();
        StoreData {
            schema_version: STORE_SCHEMA_VERSION,
            tasks: sorted_by(tables.tasks.values().cloned(), |t| (t.created_at, t.id)),
            subtasks: sorted_by(tables.subtasks.values().cloned(), |s| {
                (s.parent_task_id, s.due_date)
            }),
            budget_items: sorted_by(tables.budget_items.values().cloned(), |b| {
                (b.name.clone(), b.id)
            }),
            expenses: sorted_by(tables.expenses.values().cloned(), |e| (e.submitted_at, e.id)),
            users: sorted_by(tables.users.values().cloned(), |u| (u.name.clone(), u.id)),
        }
    }
}

impl TaskRepository for MemoryStore {
    fn insert_task(&self, task: ParentTask) -> Result<ParentTask> {
        let mut tables = self.tables.write();
        if tables.tasks.contains_key(&task.id) {
            return Err(CoreError::Conflict(format!("task {} already exists", task.id)));
        }
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    fn task(&self, id: Uuid) -> Result<Option<ParentTask>> {
        Ok(self.tables.read().tasks.get(&id).cloned())
    }

    fn tasks(&self) -> Result<Vec<ParentTask>> {
        let tables = self.tables.read();
        Ok(sorted_by(tables.tasks.values().cloned(), |t| {
            (t.created_at, t.id)
        }))
    }

    fn update_task(&self, task: ParentTask) -> Result<ParentTask> {
        let mut tables = self.tables.write();
        let slot = tables
            .tasks
            .get_mut(&task.id)
            .ok_or_else(|| CoreError::not_found("Task", task.id))?;
        *slot = task.clone();
        Ok(task)
    }

    fn subtasks(&self, parent_id: Uuid) -> Result<Vec<SubTask>> {
        let tables = self.tables.read();
        Ok(sorted_by(
            tables
                .subtasks
                .values()
                .filter(|subtask| subtask.parent_task_id == parent_id)
                .cloned(),
            |s| (s.due_date, s.id),
        ))
    }

    fn subtask(&self, id: Uuid) -> Result<Option<SubTask>> {
        Ok(self.tables.read().subtasks.get(&id).cloned())
    }

    fn update_subtask(&self, subtask: SubTask) -> Result<SubTask> {
        let mut tables = self.tables.write();
        let slot = tables
            .subtasks
            .get_mut(&subtask.id)
            .ok_or_else(|| CoreError::not_found("SubTask", subtask.id))?;
        *slot = subtask.clone();
        Ok(subtask)
    }

    fn delete_subtasks(&self, parent_id: Uuid) -> Result<usize> {
        Ok(self.tables.write().delete_subtasks(parent_id))
    }

    fn insert_subtask(&self, subtask: SubTask) -> Result<SubTask> {
        self.tables.write().insert_subtask(subtask)
    }

    fn replace_subtasks(&self, parent_id: Uuid, subtasks: Vec<SubTask>) -> Result<ReplaceOutcome> {
        let mut tables = self.tables.write();
        let mut outcome = ReplaceOutcome {
            removed: tables.delete_subtasks(parent_id),
            ..ReplaceOutcome::default()
        };
        for subtask in subtasks {
            let due_date = subtask.due_date;
            match tables.insert_subtask(subtask) {
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

impl BudgetRepository for MemoryStore {
    fn insert_budget_item(&self, item: BudgetItem) -> Result<BudgetItem> {
        let mut tables = self.tables.write();
        if tables.budget_items.contains_key(&item.id) {
            return Err(CoreError::Conflict(format!(
                "budget item {} already exists",
                item.id
            )));
        }
        tables.budget_items.insert(item.id, item.clone());
        Ok(item)
    }

    fn budget_item(&self, id: Uuid) -> Result<Option<BudgetItem>> {
        Ok(self.tables.read().budget_items.get(&id).cloned())
    }

    fn budget_items(&self) -> Result<Vec<BudgetItem>> {
        let tables = self.tables.read();
        Ok(sorted_by(tables.budget_items.values().cloned(), |b| {
            (b.name.clone(), b.id)
        }))
    }

    fn increment_spent(&self, id: Uuid, amount: Decimal) -> Result<BudgetItem> {
        self.tables.write().increment_spent(id, amount)
    }

    fn insert_expense(&self, expense: Expense) -> Result<Expense> {
        let mut tables = self.tables.write();
        if !tables.budget_items.contains_key(&expense.budget_item_id) {
            return Err(CoreError::not_found("BudgetItem", expense.budget_item_id));
        }
        if tables.expenses.contains_key(&expense.id) {
            return Err(CoreError::Conflict(format!(
                "expense {} already exists",
                expense.id
            )));
        }
        tables.expenses.insert(expense.id, expense.clone());
        Ok(expense)
    }

    fn expense(&self, id: Uuid) -> Result<Option<Expense>> {
        Ok(self.tables.read().expenses.get(&id).cloned())
    }

    fn expenses_for_item(&self, budget_item_id: Uuid) -> Result<Vec<Expense>> {
        let tables = self.tables.read();
        Ok(sorted_by(
            tables
                .expenses
                .values()
                .filter(|expense| expense.budget_item_id == budget_item_id)
                .cloned(),
            |e| (e.submitted_at, e.id),
        ))
    }

    fn append_approval(&self, expense_id: Uuid, write: ApprovalWrite) -> Result<AppendOutcome> {
        let mut tables = self.tables.write();
        let current = tables
            .expenses
            .get(&expense_id)
            .ok_or_else(|| CoreError::not_found("Expense", expense_id))?;
        if current.approval_by(write.approval.approver_id).is_some() {
            return Err(CoreError::Conflict(format!(
                "approver {} already decided on expense {}",
                write.approval.approver_id, expense_id
            )));
        }
        if current.status != write.expected_status
            || current.approvals.len() != write.expected_approvals
        {
            return Ok(AppendOutcome::Stale(current.clone()));
        }
        let (budget_item_id, amount) = (current.budget_item_id, current.amount);

        // The spend is booked first so a missing item leaves the expense as it was.
        let budget_item = if write.books_spend() {
            tables.increment_spent(budget_item_id, amount)?
        } else {
            tables
                .budget_items
                .get(&budget_item_id)
                .cloned()
                .ok_or_else(|| CoreError::not_found("BudgetItem", budget_item_id))?
        };
        let expense = tables
            .expenses
            .get_mut(&expense_id)
            .ok_or_else(|| CoreError::not_found("Expense", expense_id))?;
        expense.approvals.push(write.approval);
        expense.status = write.next_status;
        Ok(AppendOutcome::Applied {
            expense: expense.clone(),
            budget_item,
        })
    }
}

impl UserRepository for MemoryStore {
    fn insert_user(&self, user: User) -> Result<User> {
        let mut tables = self.tables.write();
        if tables.users.contains_key(&user.id) {
            return Err(CoreError::Conflict(format!("user {} already exists", user.id)));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    fn users(&self) -> Result<Vec<User>> {
        let tables = self.tables.read();
        Ok(sorted_by(tables.users.values().cloned(), |u| {
            (u.name.clone(), u.id)
        }))
    }
}
