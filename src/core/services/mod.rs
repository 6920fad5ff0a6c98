pub mod budget_service;
pub mod expense_service;
pub mod task_service;
pub mod user_service;

pub use budget_service::{BudgetService, BudgetStatus};
pub use expense_service::{ApprovalResult, ExpenseWorkflow};
pub use task_service::{NewTask, RegenerationReport, TaskService};
pub use user_service::UserService;
