use std::{
    fs,
    path::{Path, PathBuf},
};

use parking_lot::Mutex;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{
    AppendOutcome, ApprovalWrite, BudgetRepository, MemoryStore, ReplaceOutcome, StoreData,
    TaskRepository, UserRepository, STORE_SCHEMA_VERSION,
};
use crate::domain::{BudgetItem, Expense, ParentTask, SubTask, User};
use crate::errors::{CoreError, Result};
use crate::utils::paths::{ensure_dir, write_atomic};

pub const STORE_FILE: &str = "store.json";

/// [`MemoryStore`] that writes a JSON snapshot after every mutation.
///
/// Mutations run against a staged copy that only becomes visible once its
/// snapshot is on disk, so a failed write leaves both the file and the
/// in-memory state as they were.
pub struct JsonStore {
    memory: MemoryStore,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStore {
    /// Opens the store at `path`, loading an existing snapshot when present.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let memory = if path.exists() {
            MemoryStore::from_data(load_snapshot(&path)?)
        } else {
            MemoryStore::new()
        };
        tracing::debug!(path = %path.display(), "opened json store");
        Ok(Self {
            memory,
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Opens `<dir>/store.json`, creating the directory if needed.
    pub fn open_in(dir: &Path) -> Result<Self> {
        ensure_dir(dir)?;
        Self::open(dir.join(STORE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> StoreData {
        self.memory.snapshot()
    }

    fn commit<T>(&self, op: impl FnOnce(&MemoryStore) -> Result<T>) -> Result<T> {
        self.commit_when(op, |_| true)
    }

    /// Applies `op` to a staged copy and persists it when `changed` says the
    /// result touched anything.
    fn commit_when<T>(
        &self,
        op: impl FnOnce(&MemoryStore) -> Result<T>,
        changed: impl FnOnce(&T) -> bool,
    ) -> Result<T> {
        let _guard = self.write_lock.lock();
        let staged = MemoryStore::from_data(self.memory.snapshot());
        let value = op(&staged)?;
        if changed(&value) {
            if let Err(err) = write_snapshot(&self.path, &staged.snapshot()) {
                tracing::warn!(path = %self.path.display(), error = %err, "store write failed; change discarded");
                return Err(err);
            }
            self.memory.install(staged);
        }
        Ok(value)
    }
}

fn write_snapshot(path: &Path, data: &StoreData) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    write_atomic(path, &json)
}

pub fn load_snapshot(path: &Path) -> Result<StoreData> {
    let data = fs::read_to_string(path)?;
    let snapshot: StoreData = serde_json::from_str(&data)?;
    if snapshot.schema_version > STORE_SCHEMA_VERSION {
        return Err(CoreError::Storage(format!(
            "store `{}` uses schema v{} but this build supports up to v{}",
            path.display(),
            snapshot.schema_version,
            STORE_SCHEMA_VERSION
        )));
    }
    Ok(snapshot)
}

impl TaskRepository for JsonStore {
    fn insert_task(&self, task: ParentTask) -> Result<ParentTask> {
        self.commit(|store| store.insert_task(task))
    }

    fn task(&self, id: Uuid) -> Result<Option<ParentTask>> {
        self.memory.task(id)
    }

    fn tasks(&self) -> Result<Vec<ParentTask>> {
        self.memory.tasks()
    }

    fn update_task(&self, task: ParentTask) -> Result<ParentTask> {
        self.commit(|store| store.update_task(task))
    }

    fn subtasks(&self, parent_id: Uuid) -> Result<Vec<SubTask>> {
        self.memory.subtasks(parent_id)
    }

    fn subtask(&self, id: Uuid) -> Result<Option<SubTask>> {
        self.memory.subtask(id)
    }

    fn update_subtask(&self, subtask: SubTask) -> Result<SubTask> {
        self.commit(|store| store.update_subtask(subtask))
    }

    fn delete_subtasks(&self, parent_id: Uuid) -> Result<usize> {
        self.commit(|store| store.delete_subtasks(parent_id))
    }

    fn insert_subtask(&self, subtask: SubTask) -> Result<SubTask> {
        self.commit(|store| store.insert_subtask(subtask))
    }

    fn replace_subtasks(&self, parent_id: Uuid, subtasks: Vec<SubTask>) -> Result<ReplaceOutcome> {
        self.commit(|store| store.replace_subtasks(parent_id, subtasks))
    }
}

impl BudgetRepository for JsonStore {
    fn insert_budget_item(&self, item: BudgetItem) -> Result<BudgetItem> {
        self.commit(|store| store.insert_budget_item(item))
    }

    fn budget_item(&self, id: Uuid) -> Result<Option<BudgetItem>> {
        self.memory.budget_item(id)
    }

    fn budget_items(&self) -> Result<Vec<BudgetItem>> {
        self.memory.budget_items()
    }

    fn increment_spent(&self, id: Uuid, amount: Decimal) -> Result<BudgetItem> {
        self.commit(|store| store.increment_spent(id, amount))
    }

    fn insert_expense(&self, expense: Expense) -> Result<Expense> {
        self.commit(|store| store.insert_expense(expense))
    }

    fn expense(&self, id: Uuid) -> Result<Option<Expense>> {
        self.memory.expense(id)
    }

    fn expenses_for_item(&self, budget_item_id: Uuid) -> Result<Vec<Expense>> {
        self.memory.expenses_for_item(budget_item_id)
    }

    fn append_approval(&self, expense_id: Uuid, write: ApprovalWrite) -> Result<AppendOutcome> {
        self.commit_when(
            |store| store.append_approval(expense_id, write),
            |outcome| matches!(outcome, AppendOutcome::Applied { .. }),
        )
    }
}

impl UserRepository for JsonStore {
    fn insert_user(&self, user: User) -> Result<User> {
        self.commit(|store| store.insert_user(user))
    }

    fn user(&self, id: Uuid) -> Result<Option<User>> {
        self.memory.user(id)
    }

    fn users(&self) -> Result<Vec<User>> {
        self.memory.users()
    }
}
