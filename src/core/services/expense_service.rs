//! Expense submission and the multi-level approval state machine.
//!
//! `PENDING -> APPROVED` and `PENDING -> REJECTED` are the only transitions.
//! The owning budget item's spent amount moves exactly once, on the
//! transition into `APPROVED`, inside the same storage write that records
//! the deciding approval.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::core::approval::{resolve_status, ApproverLevels};
use crate::domain::{
    ApprovalDecision, BudgetItem, Expense, ExpenseApproval, ExpenseStatus,
};
use crate::errors::{CoreError, Result};
use crate::storage::{AppendOutcome, ApprovalWrite, BudgetRepository, UserRepository};

/// How often a conditional append is retried after losing a race.
const MAX_APPEND_ATTEMPTS: usize = 5;

/// Everything a caller needs after a decision was recorded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalResult {
    pub approval: ExpenseApproval,
    pub expense: Expense,
    pub budget_item: BudgetItem,
    /// This decision moved the expense out of `PENDING`.
    pub transitioned: bool,
}

pub struct ExpenseWorkflow {
    budgets: Arc<dyn BudgetRepository>,
    users: Arc<dyn UserRepository>,
    levels: ApproverLevels,
}

impl ExpenseWorkflow {
    pub fn new(
        budgets: Arc<dyn BudgetRepository>,
        users: Arc<dyn UserRepository>,
        levels: ApproverLevels,
    ) -> Self {
        Self {
            budgets,
            users,
            levels,
        }
    }

    pub fn levels(&self) -> &ApproverLevels {
        &self.levels
    }

    /// Creates a pending expense after checking it fits the remaining budget.
    ///
    /// The check reads the current spent amount and reserves nothing, so two
    /// submissions racing against the same item can both pass.
    pub fn submit_expense(
        &self,
        budget_item_id: Uuid,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Result<Expense> {
        if amount <= Decimal::ZERO {
            return Err(CoreError::Validation(format!(
                "expense amount must be positive, got {amount}"
            )));
        }
        let item = self
            .budgets
            .budget_item(budget_item_id)?
            .ok_or_else(|| CoreError::not_found("BudgetItem", budget_item_id))?;
        if let Some(shortfall) = item.shortfall_for(amount) {
            tracing::debug!(
                budget_item_id = %item.id,
                requested = %amount,
                shortfall = %shortfall,
                "expense rejected by budget guard"
            );
            return Err(CoreError::BudgetExceeded {
                planned: item.planned_amount,
                spent: item.spent_amount,
                requested: amount,
                shortfall,
            });
        }
        let expense = self
            .budgets
            .insert_expense(Expense::new(item.id, amount, description))?;
        tracing::info!(expense_id = %expense.id, budget_item_id = %item.id, amount = %amount, "submitted expense");
        Ok(expense)
    }

    /// Records one approver's decision and recomputes the expense status.
    pub fn submit_approval(
        &self,
        expense_id: Uuid,
        approver_id: Uuid,
        decision: ApprovalDecision,
        comment: Option<String>,
    ) -> Result<ApprovalResult> {
        let mut expense = self.expense(expense_id)?;
        let approver = self
            .users
            .user(approver_id)?
            .ok_or_else(|| CoreError::not_found("User", approver_id))?;
        let level = self.levels.level_for(&approver.role).ok_or_else(|| {
            CoreError::Forbidden(format!(
                "role `{}` of user {} cannot approve expenses",
                approver.role, approver.id
            ))
        })?;
        let approval =
            ExpenseApproval::new(expense.id, approver.id, level, decision, comment, Utc::now());

        for _ in 0..MAX_APPEND_ATTEMPTS {
            if expense.approval_by(approver.id).is_some() {
                return Err(CoreError::Conflict(format!(
                    "user {} already decided on expense {}",
                    approver.id, expense.id
                )));
            }
            if expense.status.is_terminal() {
                return Err(CoreError::Conflict(format!(
                    "expense {} is already {}",
                    expense.id, expense.status
                )));
            }

            let mut recorded = expense.approvals.clone();
            recorded.push(approval.clone());
            let write = ApprovalWrite {
                approval: approval.clone(),
                expected_status: expense.status,
                expected_approvals: expense.approvals.len(),
                next_status: resolve_status(&recorded),
            };

            match self.budgets.append_approval(expense.id, write)? {
                AppendOutcome::Applied {
                    expense: updated,
                    budget_item,
                } => {
                    return Ok(finish_approval(
                        expense.status,
                        approval,
                        updated,
                        budget_item,
                    ));
                }
                AppendOutcome::Stale(current) => {
                    tracing::debug!(expense_id = %expense.id, "expense changed underneath approval; retrying");
                    expense = current;
                }
            }
        }

        Err(CoreError::Conflict(format!(
            "expense {expense_id} is being decided concurrently; try again"
        )))
    }

    pub fn expense(&self, id: Uuid) -> Result<Expense> {
        self.budgets
            .expense(id)?
            .ok_or_else(|| CoreError::not_found("Expense", id))
    }

    pub fn expenses_for_item(&self, budget_item_id: Uuid) -> Result<Vec<Expense>> {
        self.budgets.expenses_for_item(budget_item_id)
    }
}

fn finish_approval(
    previous: ExpenseStatus,
    approval: ExpenseApproval,
    expense: Expense,
    budget_item: BudgetItem,
) -> ApprovalResult {
    if previous != expense.status {
        match expense.status {
            ExpenseStatus::Approved => tracing::info!(
                expense_id = %expense.id,
                budget_item_id = %budget_item.id,
                amount = %expense.amount,
                spent = %budget_item.spent_amount,
                "expense approved; spend recorded"
            ),
            ExpenseStatus::Rejected => tracing::info!(
                expense_id = %expense.id,
                approver_id = %approval.approver_id,
                "expense rejected"
            ),
            ExpenseStatus::Pending => {}
        }
    }

    ApprovalResult {
        transitioned: previous != expense.status,
        approval,
        expense,
        budget_item,
    }
}
