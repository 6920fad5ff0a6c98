//! Application services over the storage traits.

pub mod approval;
pub mod services;

use std::sync::Arc;

use crate::config::Config;
use crate::storage::{BudgetRepository, TaskRepository, UserRepository};

pub use approval::{resolve_status, ApproverLevels, APPROVAL_THRESHOLD_LEVEL};
pub use services::{
    ApprovalResult, BudgetService, BudgetStatus, ExpenseWorkflow, NewTask, RegenerationReport,
    TaskService, UserService,
};

/// Every service wired to one backing store.
pub struct Services {
    pub tasks: TaskService,
    pub budgets: BudgetService,
    pub expenses: ExpenseWorkflow,
    pub users: UserService,
}

impl Services {
    pub fn new<S>(store: Arc<S>, config: &Config) -> Self
    where
        S: TaskRepository + BudgetRepository + UserRepository + 'static,
    {
        let tasks: Arc<dyn TaskRepository> = store.clone();
        let budgets: Arc<dyn BudgetRepository> = store.clone();
        let users: Arc<dyn UserRepository> = store;
        Self {
            tasks: TaskService::new(tasks, config.program_window),
            budgets: BudgetService::new(budgets.clone()),
            expenses: ExpenseWorkflow::new(
                budgets,
                users.clone(),
                ApproverLevels::from_config(config),
            ),
            users: UserService::new(users),
        }
    }
}
